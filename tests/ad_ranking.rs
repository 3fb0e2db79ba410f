#[cfg(test)]
mod tests {
    use pawpal::ads::{load_catalog, rank, score, Advertisement};
    use pawpal::profile::Profile;
    use std::collections::BTreeSet;

    fn ad(id: &str, breeds: &[&str], conditions: &[&str]) -> Advertisement {
        Advertisement {
            id: id.to_string(),
            title: id.to_string(),
            body: String::new(),
            category: "test".to_string(),
            target_breeds: breeds.iter().map(|s| s.to_string()).collect(),
            target_conditions: conditions.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn rank_is_a_permutation_of_the_catalog() {
        let catalog = load_catalog().unwrap();
        let profile = Profile {
            breed: "German Shepherd mix".to_string(),
            conditions: "hip dysplasia, itchy skin".to_string(),
            ..Default::default()
        };

        let ranked = rank(&catalog, &profile);
        assert_eq!(ranked.len(), catalog.len());

        let before: BTreeSet<&str> = catalog.iter().map(|a| a.id.as_str()).collect();
        let after: BTreeSet<&str> = ranked.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(before, after);
    }

    #[test]
    fn empty_profile_keeps_catalog_order() {
        let catalog = load_catalog().unwrap();
        let ranked = rank(&catalog, &Profile::default());

        let before: Vec<&str> = catalog.iter().map(|a| a.id.as_str()).collect();
        let after: Vec<&str> = ranked.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(before, after);
    }

    #[test]
    fn breed_match_outranks_non_match() {
        // One ad targets a breed, one a condition; the profile only has a breed.
        let catalog = vec![
            ad("diabetes-food", &[], &["Diabetes"]),
            ad("lab-chews", &["Labrador"], &[]),
        ];
        let profile = Profile {
            breed: "Labrador Retriever".to_string(),
            conditions: "".to_string(),
            ..Default::default()
        };

        assert_eq!(score(&catalog[0], &profile), 0);
        assert_eq!(score(&catalog[1], &profile), 2);

        let ranked = rank(&catalog, &profile);
        assert_eq!(ranked[0].id, "lab-chews");
        assert_eq!(ranked[1].id, "diabetes-food");
    }

    #[test]
    fn condition_substring_matches_case_insensitively() {
        let kidney_ad = ad("renal", &[], &["Kidney"]);
        let profile = Profile {
            conditions: "Chronic Kidney issues".to_string(),
            ..Default::default()
        };
        assert_eq!(score(&kidney_ad, &profile), 3);
    }

    #[test]
    fn breed_and_condition_scores_accumulate() {
        let combo = ad("combo", &["Labrador"], &["arthritis"]);
        let profile = Profile {
            breed: "chocolate labrador".to_string(),
            conditions: "early arthritis".to_string(),
            ..Default::default()
        };
        assert_eq!(score(&combo, &profile), 5);
    }

    #[test]
    fn condition_matches_outrank_breed_matches() {
        let catalog = vec![
            ad("breed-only", &["Beagle"], &[]),
            ad("condition-only", &[], &["diabetes"]),
        ];
        let profile = Profile {
            breed: "Beagle".to_string(),
            conditions: "diabetes".to_string(),
            ..Default::default()
        };

        let ranked = rank(&catalog, &profile);
        assert_eq!(ranked[0].id, "condition-only"); // 3 beats 2
    }
}
