#[cfg(test)]
mod tests {
    use pawpal::advice::models::Source;
    use pawpal::db::connection::SCHEMA;
    use pawpal::db::service::DbService;
    use pawpal::profile::Profile;
    use serde_json::json;

    // In memory database just for tests
    fn get_test_db() -> duckdb::Connection {
        let conn = duckdb::Connection::open_in_memory().unwrap();
        conn.execute_batch(SCHEMA).unwrap();
        conn
    }

    #[test]
    fn test_session_lifecycle() {
        let conn = get_test_db();

        // 1. Insert Session
        let session = DbService::insert_session(&conn, "Rex checkup", json!({"source": "test"})).unwrap();
        assert_eq!(session.name, "Rex checkup");

        // 2. Get Session
        let fetched = DbService::get_session(&conn, session.id).unwrap().unwrap();
        assert_eq!(fetched.id, session.id);

        // 3. List Sessions
        let list = DbService::list_sessions(&conn, 10, 0).unwrap();
        assert_eq!(list.len(), 1);

        // 4. Delete Session
        DbService::delete_session(&conn, session.id).unwrap();
        let deleted = DbService::get_session(&conn, session.id).unwrap();
        assert!(deleted.is_none());
    }

    #[test]
    fn test_turn_lifecycle_with_sources() {
        let conn = get_test_db();
        let session = DbService::insert_session(&conn, "Feeding questions", json!({})).unwrap();

        let user = DbService::insert_turn(&conn, session.id, "user", "How much kibble?", &[]).unwrap();
        assert_eq!(user.role, "user");
        assert_eq!(user.session_id, session.id);
        assert!(user.sources.is_empty());

        let sources = vec![Source {
            title: "Feeding guide".to_string(),
            uri: "https://example.com/guide".to_string(),
        }];
        let assistant =
            DbService::insert_turn(&conn, session.id, "assistant", "About two cups.", &sources).unwrap();
        assert_eq!(assistant.sources, sources);

        // Order is append-only by creation
        let history = DbService::get_turns(&conn, session.id, 10, 0).unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].role, "user");
        assert_eq!(history[1].role, "assistant");
        assert_eq!(history[1].sources.len(), 1);

        // Deleting the session takes its turns with it
        DbService::delete_session(&conn, session.id).unwrap();
        let empty_history = DbService::get_turns(&conn, session.id, 10, 0).unwrap();
        assert_eq!(empty_history.len(), 0);
    }

    #[test]
    fn test_profile_roundtrip() {
        let conn = get_test_db();

        // No stored profile yet: empty default, not an error
        let initial = DbService::load_profile(&conn).unwrap();
        assert_eq!(initial, Profile::default());

        let profile = Profile {
            name: "Rex".to_string(),
            breed: "Labrador Retriever".to_string(),
            age: "5 years".to_string(),
            weight: "30kg".to_string(),
            conditions: "arthritis".to_string(),
            ..Default::default()
        };
        DbService::save_profile(&conn, &profile).unwrap();
        assert_eq!(DbService::load_profile(&conn).unwrap(), profile);

        // Saving again replaces rather than duplicates
        let renamed = Profile { name: "Rexy".to_string(), ..profile };
        DbService::save_profile(&conn, &renamed).unwrap();
        assert_eq!(DbService::load_profile(&conn).unwrap().name, "Rexy");
    }

    #[test]
    fn test_malformed_profile_falls_back_to_default() {
        let conn = get_test_db();

        conn.execute(
            "INSERT OR REPLACE INTO kv (key, value) VALUES ('profile', '{\"name\": 42}')",
            [],
        )
        .unwrap();

        let profile = DbService::load_profile(&conn).unwrap();
        assert_eq!(profile, Profile::default());
    }
}
