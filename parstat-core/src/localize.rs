use anyhow::{anyhow, Result};
use fluent_bundle::{FluentArgs, FluentBundle, FluentResource, FluentValue};
use unic_langid::LanguageIdentifier;

const EN_GB: &str = include_str!("../i18n/en-GB.ftl");

/// Fluent message catalogue for the report prose.
pub struct FluentLoc {
    bundle: FluentBundle<FluentResource>,
}

impl FluentLoc {
    /// Localizer over the built-in resources; every tag currently maps to en-GB.
    pub fn builtin(lang: &str) -> Result<Self> {
        let langid: LanguageIdentifier = lang.parse().unwrap_or_default();
        let res = FluentResource::try_new(EN_GB.to_owned())
            .map_err(|(_, errs)| anyhow!("invalid FTL resource for {lang}: {errs:?}"))?;

        let mut bundle = FluentBundle::new(vec![langid]);
        // Output is plain text; no bidi isolation marks around arguments.
        bundle.set_use_isolating(false);
        bundle.add_resource(res).map_err(|errs| anyhow!("add FTL resource: {errs:?}"))?;
        Ok(Self { bundle })
    }

    /// Format message `code` with named string args. Unknown codes and
    /// formatting failures yield the code itself.
    pub fn msg(&self, code: &str, args: &[(&str, &str)]) -> String {
        let Some(pattern) = self.bundle.get_message(code).and_then(|m| m.value()) else {
            return code.to_string();
        };
        let mut fa = FluentArgs::new();
        for &(k, v) in args {
            fa.set(k, FluentValue::from(v));
        }
        let mut errs = vec![];
        let s = self.bundle.format_pattern(pattern, Some(&fa), &mut errs);
        if errs.is_empty() {
            s.into_owned()
        } else {
            code.to_string()
        }
    }
}
