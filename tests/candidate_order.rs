// tests/candidate_order.rs

use std::path::PathBuf;

use proptest::prelude::*;
use procguard::resolve::candidates::{SearchEnv, WINDOWS_VARIANTS, standard_candidates};
use procguard::types::Platform;

fn dirs_strategy() -> impl Strategy<Value = Vec<String>> {
    proptest::collection::vec("[a-z]{1,8}", 0..6)
        .prop_map(|names| names.into_iter().map(|n| format!("/{n}")).collect())
}

proptest! {
    #[test]
    fn unix_candidates_follow_path_order(dirs in dirs_strategy(), name in "[a-z]{1,10}") {
        let env = SearchEnv::empty(Platform::Unix, "/cwd").with_var("PATH", dirs.join(":"));
        let got = standard_candidates(&name, &env);

        let expected: Vec<PathBuf> = std::iter::once("/cwd".to_string())
            .chain(dirs)
            .map(|d| PathBuf::from(d).join(&name))
            .collect();
        prop_assert_eq!(got, expected);
    }

    #[test]
    fn windows_candidates_keep_variants_together(dirs in dirs_strategy(), name in "[a-z]{1,10}") {
        let env = SearchEnv::empty(Platform::Windows, "/cwd").with_var("PATH", dirs.join(";"));
        let got = standard_candidates(&name, &env);

        prop_assert_eq!(got.len(), (dirs.len() + 1) * WINDOWS_VARIANTS.len());
        for (group, dir) in got.chunks(WINDOWS_VARIANTS.len()).zip(std::iter::once("/cwd".to_string()).chain(dirs)) {
            for (candidate, ext) in group.iter().zip(WINDOWS_VARIANTS) {
                prop_assert_eq!(candidate, &PathBuf::from(&dir).join(format!("{name}{ext}")));
            }
        }
    }

    #[test]
    fn names_with_an_extension_are_not_expanded(dirs in dirs_strategy(), name in "[a-z]{1,10}") {
        let env = SearchEnv::empty(Platform::Windows, "/cwd").with_var("PATH", dirs.join(";"));
        let got = standard_candidates(&format!("{name}.exe"), &env);
        prop_assert_eq!(got.len(), dirs.len() + 1);
    }
}
