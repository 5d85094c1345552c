//! Property tests over the (mode, target, flags) space.

mod common;

use common::context_with;
use peco_plan::{BuildOptions, CssVariant, Mode, PluginKind, Target, build_plan};
use proptest::prelude::*;
use serde_json::Value;

fn mode() -> impl Strategy<Value = Mode> {
    prop_oneof![Just(Mode::Development), Just(Mode::Production)]
}

fn target() -> impl Strategy<Value = Target> {
    prop_oneof![Just(Target::Client), Just(Target::Server)]
}

fn options() -> impl Strategy<Value = BuildOptions> {
    (
        proptest::option::of(any::<bool>()),
        proptest::option::of(any::<bool>()),
        any::<bool>(),
        any::<u16>(),
    )
        .prop_map(|(minimize, progress, debug, port)| BuildOptions {
            minimize,
            progress,
            debug,
            port,
            ..BuildOptions::default()
        })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn prop_minimizer_only_for_production_client(mode in mode(), target in target(), options in options()) {
        let expected = mode == Mode::Production && target == Target::Client && options.minimize != Some(false);
        let plan = build_plan(&context_with(mode, target, options)).unwrap();

        prop_assert_eq!(plan.has_plugin(PluginKind::Minimizer), expected);
        prop_assert_eq!(plan.optimization().minimize, expected);
    }

    #[test]
    fn prop_css_extraction_only_for_production_client(mode in mode(), target in target(), options in options()) {
        let plan = build_plan(&context_with(mode, target, options)).unwrap();
        let extracting = mode == Mode::Production && target == Target::Client;

        prop_assert_eq!(plan.has_plugin(PluginKind::CssExtract), extracting);
        for rule in plan.rules().iter().filter(|rule| !rule.one_of.is_empty()) {
            for branch in &rule.one_of {
                let has_extract = branch.uses.iter().any(|s| s.loader == "extract-css-loader");
                prop_assert_eq!(has_extract, extracting);
            }
        }
    }

    #[test]
    fn prop_css_variants_differ_only_in_modules_flag(mode in mode(), target in target(), options in options()) {
        let plan = build_plan(&context_with(mode, target, options)).unwrap();

        for key in ["css", "scss", "sass", "less", "stylus"] {
            let rule = plan.rule(key).unwrap();
            let modules = rule.variant(CssVariant::Modules).unwrap();
            let normal = rule.variant(CssVariant::Normal).unwrap();
            prop_assert_eq!(modules.uses.len(), normal.uses.len());

            for (scoped, global) in modules.uses.iter().zip(&normal.uses) {
                prop_assert_eq!(&scoped.name, &global.name);
                prop_assert_eq!(&scoped.loader, &global.loader);
                if scoped.name == "css-loader" {
                    prop_assert_eq!(scoped.get("modules"), Some(&Value::Bool(true)));
                    prop_assert_eq!(global.get("modules"), Some(&Value::Bool(false)));
                    let mut a = scoped.options.clone();
                    let mut b = global.options.clone();
                    a.remove("modules");
                    b.remove("modules");
                    prop_assert_eq!(a, b);
                } else {
                    prop_assert_eq!(&scoped.options, &global.options);
                }
            }
        }
    }

    #[test]
    fn prop_plans_are_deterministic(mode in mode(), target in target(), options in options()) {
        let ctx = context_with(mode, target, options);
        let first = build_plan(&ctx).unwrap();
        let second = build_plan(&ctx).unwrap();
        prop_assert_eq!(first.to_value().unwrap(), second.to_value().unwrap());
        prop_assert_eq!(first, second);
    }

    #[test]
    fn prop_every_referenced_alias_is_defined(mode in mode(), target in target(), options in options()) {
        let plan = build_plan(&context_with(mode, target, options)).unwrap();
        for rule in plan.rules() {
            for alias in rule.referenced_aliases() {
                prop_assert!(plan.aliases().contains(alias), "{} references {}", rule.key, alias);
            }
        }
    }

    #[test]
    fn prop_reporter_and_constants_always_present(mode in mode(), target in target(), options in options()) {
        let plan = build_plan(&context_with(mode, target, options.clone())).unwrap();
        prop_assert!(plan.has_plugin(PluginKind::Reporter));
        prop_assert!(plan.has_plugin(PluginKind::Constants));
        prop_assert_eq!(plan.has_plugin(PluginKind::Timefix), mode == Mode::Development);
        prop_assert_eq!(plan.has_plugin(PluginKind::ProgressBar), options.progress != Some(false));
    }
}
