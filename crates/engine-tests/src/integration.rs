#[cfg(test)]
mod tests {
    use crate::{
        record_set, response_of, search_response,
        utils::{assert_all_missing, assert_row_count, cell, column_names, non_missing_count},
    };
    use connectors::file::csv::{reader::read_table_from, writer::to_csv_bytes};
    use engine_config::settings::pipeline::PipelineSettings;
    use engine_processing::{
        search::SearchResultPipeline,
        transform::{error::TransformError, flatten::flatten},
    };
    use model::{
        core::value::Value, records::error::ResponseError,
        transform::flatten_spec::FieldFlattenSpec,
    };
    use serde_json::json;

    // Scenario: the second of three records has no `salaire` at all.
    // Expected Outcome:
    // - its row in the fragment is entirely missing markers;
    // - the other rows carry their own sub-keys, missing markers for the rest.
    #[test]
    fn tc01_object_to_columns_with_absent_field() {
        let set = record_set(vec![
            json!({"id": "1", "salaire": {"libelle": "Annuel 40k", "complement1": "Primes"}}),
            json!({"id": "2", "intitule": "BI developer"}),
            json!({"id": "3", "salaire": {"libelle": "Mensuel 3k", "commentaire": "selon profil"}}),
        ]);

        let fragment = flatten(&set, &FieldFlattenSpec::object("salaire")).unwrap();

        assert_row_count(&fragment, 3);
        assert_eq!(
            column_names(&fragment),
            vec!["libelle", "complement1", "commentaire"]
        );
        assert_all_missing(&fragment, "2");
        assert_eq!(cell(&fragment, "1", "complement1"), &Value::from("Primes"));
        assert_eq!(cell(&fragment, "1", "commentaire"), &Value::Null);
        assert_eq!(cell(&fragment, "3", "complement1"), &Value::Null);
        assert_eq!(cell(&fragment, "3", "commentaire"), &Value::from("selon profil"));
    }

    // Scenario: `lieuTravail.libelle` is "33 - Bordeaux" in one record and "75" in another.
    // Expected Outcome: ("33", "Bordeaux") and ("75", <missing>).
    #[test]
    fn tc02_split_on_delimiter() {
        let set = record_set(vec![
            json!({"id": "1", "lieuTravail": {"libelle": "33 - Bordeaux"}}),
            json!({"id": "2", "lieuTravail": {"libelle": "75"}}),
        ]);
        let spec = FieldFlattenSpec::split("lieuTravail.libelle", " - ", &["departement", "ville"]);

        let fragment = flatten(&set, &spec).unwrap();

        assert_eq!(cell(&fragment, "1", "departement"), &Value::from("33"));
        assert_eq!(cell(&fragment, "1", "ville"), &Value::from("Bordeaux"));
        assert_eq!(cell(&fragment, "2", "departement"), &Value::from("75"));
        assert_eq!(cell(&fragment, "2", "ville"), &Value::Null);
    }

    // Scenario: threshold 50%, over ten records.
    // Expected Outcome:
    // - a column missing in 6 of 10 rows (60%) is flagged and pruned;
    // - a column missing in exactly 5 of 10 rows (50%) is kept.
    #[test]
    fn tc03_threshold_is_strict_percentage() {
        let records = (0..10)
            .map(|i| {
                let mut record = json!({"id": format!("{i}")});
                if i < 4 {
                    record["sixty"] = json!("x");
                }
                if i < 5 {
                    record["fifty"] = json!("y");
                }
                record
            })
            .collect();

        let outcome = SearchResultPipeline::new(vec![], Some(50.0))
            .run(&response_of(records))
            .unwrap();

        assert!(outcome.high_missingness.contains("sixty"));
        assert!(!outcome.high_missingness.contains("fifty"));
        assert!(!outcome.table.contains_column("sixty"));
        assert!(outcome.table.contains_column("fifty"));
        assert_eq!(outcome.report.get("sixty").map(|c| c.missing_pct), Some(60.0));
        assert_eq!(outcome.report.get("fifty").map(|c| c.missing_pct), Some(50.0));
        assert_row_count(&outcome.table, 10);
    }

    // Scenario: the raw response has no `Content-Range`.
    // Expected Outcome: MalformedResponse, and no table at all.
    #[test]
    fn tc04_missing_content_range_is_malformed() {
        let mut raw = search_response();
        raw.as_object_mut().unwrap().remove("Content-Range");

        let result = SearchResultPipeline::from_settings(&PipelineSettings::default()).run(&raw);

        assert!(matches!(
            result,
            Err(TransformError::MalformedResponse(ResponseError::MissingKey("Content-Range")))
        ));
    }

    // Scenario: the default field policy over a real-shaped response.
    // Expected Outcome:
    // - one row per offer, nested source columns replaced by their fragments;
    // - renames and sub-column drops applied, competences capped at three;
    // - the explicit drop list removed.
    #[test]
    fn tc05_default_policy_over_fixture() {
        let outcome = SearchResultPipeline::from_settings(&PipelineSettings::default())
            .run(&search_response())
            .unwrap();
        let table = &outcome.table;

        assert_row_count(table, 4);
        assert_eq!(outcome.max_results, 1234);
        assert_eq!(outcome.facets.len(), 4);
        assert!(outcome.skipped.is_empty(), "skipped: {:?}", outcome.skipped);

        for gone in [
            "lieuTravail.libelle",
            "entreprise.nom",
            "salaire.libelle",
            "competences",
            "logo",
            "complement1",
            "coordonnees1",
            "courriel",
            "competences_3",
        ] {
            assert!(!table.contains_column(gone), "`{gone}` should be gone");
        }

        assert_eq!(cell(table, "170KQWX", "departement"), &Value::from("33"));
        assert_eq!(cell(table, "170KQWX", "ville"), &Value::from("Bordeaux"));
        assert_eq!(cell(table, "170KQWY", "ville"), &Value::Null);
        assert_eq!(cell(table, "170KQWX", "nomEntreprise"), &Value::from("ACME Analytics"));
        assert_eq!(
            cell(table, "170KQWZ", "salaire"),
            &Value::from("Mensuel de 3500.00 Euros sur 12 mois")
        );
        assert_eq!(cell(table, "170KQWZ", "nomContact"), &Value::from("Initech - M. Durand"));
        assert_eq!(cell(table, "170KQXA", "origineOffre"), &Value::from("1"));
        assert_eq!(cell(table, "170KQWX", "competences_2"), &Value::from("Power BI"));
        assert_eq!(cell(table, "170KQXA", "langues_1"), &Value::from("Espagnol"));
        assert_eq!(cell(table, "170KQWZ", "permis_0"), &Value::from("B - Vehicule leger"));
        assert_eq!(cell(table, "170KQWX", "formations_0"), &Value::from("Statistiques"));
        assert_eq!(cell(table, "170KQWX", "lieuTravail.codePostal"), &Value::from("33000"));

        // The report is taken before the drop list ran.
        assert_eq!(
            outcome.report.columns.len(),
            table.column_count() + outcome.dropped.len()
        );
        assert!(outcome.dropped.contains(&"courriel".to_string()));
        for dropped in &outcome.dropped {
            assert!(outcome.report.get(dropped).is_some());
        }
    }

    // Scenario: two specs would both produce a `nom` column.
    // Expected Outcome: the run aborts with DuplicateColumn instead of suffixing.
    #[test]
    fn tc06_unresolved_collision_aborts() {
        let specs = vec![
            FieldFlattenSpec::object("entreprise"),
            FieldFlattenSpec::object("contact"),
        ];
        let err = SearchResultPipeline::new(specs, None)
            .run(&search_response())
            .unwrap_err();
        assert!(matches!(err, TransformError::DuplicateColumn { ref column, .. } if column == "nom"));
    }

    // Scenario: ids `a`, `a#2`, `a`; the repeated `a` must not take the id of
    // the second record.
    // Expected Outcome: three distinct rows, each with its own salary.
    #[test]
    fn tc07_repeated_ids_keep_rows_apart() {
        let raw = response_of(vec![
            json!({"id": "a", "salaire": {"libelle": "first"}}),
            json!({"id": "a#2", "salaire": {"libelle": "second"}}),
            json!({"id": "a", "salaire": {"libelle": "third"}}),
        ]);
        let outcome = SearchResultPipeline::new(vec![FieldFlattenSpec::object("salaire")], None)
            .run(&raw)
            .unwrap();

        assert_row_count(&outcome.table, 3);
        assert_eq!(cell(&outcome.table, "a", "libelle"), &Value::from("first"));
        assert_eq!(cell(&outcome.table, "a#2", "libelle"), &Value::from("second"));
        assert_eq!(cell(&outcome.table, "a#3", "libelle"), &Value::from("third"));
    }

    // Scenario: an offer carries an empty `complementExercice`.
    // Expected Outcome: the audit and the exported CSV agree on what is missing.
    #[test]
    fn tc08_empty_string_round_trips_as_missing() {
        let raw = response_of(vec![
            json!({"id": "1", "complementExercice": "", "intitule": "A"}),
            json!({"id": "2", "complementExercice": "Temps partiel", "intitule": "B"}),
        ]);
        let outcome = SearchResultPipeline::new(vec![], None).run(&raw).unwrap();
        let entry = outcome.report.get("complementExercice").unwrap();
        assert_eq!((entry.present, entry.missing), (1, 1));

        let parsed = read_table_from(to_csv_bytes(&outcome.table).unwrap().as_slice()).unwrap();
        for column in outcome.table.columns() {
            assert_eq!(
                non_missing_count(&parsed, column),
                non_missing_count(&outcome.table, column),
                "column `{column}`"
            );
        }
    }

    // Scenario: `salaire` is a mapping in one offer and plain text in another,
    // under the default policy that renames `libelle` to `salaire`.
    // Expected Outcome: the run succeeds; the plain text lands in `salaire_value`.
    #[test]
    fn tc09_plain_and_nested_salary_under_default_policy() {
        let raw = response_of(vec![
            json!({"id": "1", "salaire": {"libelle": "Annuel 40k"}}),
            json!({"id": "2", "salaire": "a negocier"}),
        ]);
        let outcome = SearchResultPipeline::from_settings(&PipelineSettings::default())
            .run(&raw)
            .unwrap();

        assert_eq!(cell(&outcome.table, "1", "salaire"), &Value::from("Annuel 40k"));
        assert_eq!(cell(&outcome.table, "2", "salaire_value"), &Value::from("a negocier"));
        assert_eq!(cell(&outcome.table, "2", "salaire"), &Value::Null);
    }
}
