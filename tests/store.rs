#[cfg(test)]
mod conditions {
    use ferrum_dynamo::{
        mapping::{Item, WireValue},
        store::{KeyCondition, SortCondition, compare_values},
    };
    use std::cmp::Ordering;

    fn _item(partition: &str, sort: WireValue) -> Item {
        let mut item = Item::new();
        item.insert("Pk".to_string(), WireValue::string(partition));
        item.insert("Sk".to_string(), sort);
        item
    }

    #[test]
    fn numbers_compare_by_value_not_by_text() {
        let nine = WireValue::number("9");
        let ten = WireValue::number("10");

        assert_eq!(compare_values(&ten, &nine), Some(Ordering::Greater));
        assert_eq!(
            compare_values(&WireValue::number("1.50"), &WireValue::number("1.5")),
            Some(Ordering::Equal)
        );
        assert_eq!(
            compare_values(&WireValue::string("10"), &WireValue::string("9")),
            Some(Ordering::Less)
        );
    }

    #[test]
    fn numbers_with_digit_separators_do_not_compare() {
        assert_eq!(
            compare_values(&WireValue::number("1_000"), &WireValue::number("1000")),
            None
        );
        assert!(!SortCondition::Ge(WireValue::number("0")).matches(&WireValue::number("1_000")));
    }

    #[test]
    fn values_of_different_kinds_do_not_compare() {
        assert_eq!(compare_values(&WireValue::number("1"), &WireValue::string("1")), None);
        assert_eq!(compare_values(&WireValue::Absent, &WireValue::Absent), None);
        assert!(!SortCondition::Eq(WireValue::number("1")).matches(&WireValue::string("1")));
    }

    #[test]
    fn sort_conditions_bound_inclusively_where_they_say_so() {
        let five = WireValue::number("5");

        assert!(SortCondition::Ge(WireValue::number("5")).matches(&five));
        assert!(!SortCondition::Gt(WireValue::number("5")).matches(&five));
        assert!(SortCondition::Le(WireValue::number("5")).matches(&five));
        assert!(!SortCondition::Lt(WireValue::number("5")).matches(&five));
        assert!(SortCondition::Between(WireValue::number("5"), WireValue::number("7")).matches(&five));
        assert!(!SortCondition::Between(WireValue::number("6"), WireValue::number("7")).matches(&five));
    }

    #[test]
    fn prefixes_only_match_strings() {
        let condition = SortCondition::BeginsWith("2024-".to_string());

        assert!(condition.matches(&WireValue::string("2024-06-04")));
        assert!(!condition.matches(&WireValue::string("2023-12-31")));
        assert!(!condition.matches(&WireValue::number("2024")));
    }

    #[test]
    fn key_conditions_need_both_halves() {
        let condition = KeyCondition::partition("Pk", WireValue::string("a"))
            .sort("Sk", SortCondition::Ge(WireValue::number("10")));

        assert!(condition.matches(&_item("a", WireValue::number("12"))));
        assert!(!condition.matches(&_item("a", WireValue::number("8"))));
        assert!(!condition.matches(&_item("b", WireValue::number("12"))));

        let mut no_sort = _item("a", WireValue::Absent);
        no_sort.shift_remove("Sk");
        assert!(!condition.matches(&no_sort));
        assert!(KeyCondition::partition("Pk", WireValue::string("a")).matches(&no_sort));
    }
}

#[cfg(test)]
mod jobs_table {
    use std::sync::Arc;

    use ferrum_dynamo::{
        Error, ErrorKind,
        jobs::{self, JobReport, JobStatus},
        mapping::WireValue,
        store::{EntityTable, MemoryStore, StoreError, TableStore},
    };

    async fn _table() -> (Arc<MemoryStore>, EntityTable<JobReport, MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        store.create_table(&jobs::schema().unwrap()).await.unwrap();
        let table = EntityTable::new(Arc::clone(&store), jobs::TABLE_NAME).unwrap();
        (store, table)
    }

    #[tokio::test]
    async fn sample_reports_populate_completely() {
        let (store, table) = _table().await;

        let report = table.put_all(&jobs::sample_reports()).await;

        assert!(report.is_complete());
        assert_eq!(report.written, 5);
        assert_eq!(report.to_string(), "5 of 5 record(s) written");
        assert_eq!(store.calls().put, 5);

        let mut scanned = table.scan().await.unwrap();
        let mut expected = jobs::sample_reports();
        scanned.sort_by_key(|r| (r.user_id.clone(), r.job_creation_timestamp));
        expected.sort_by_key(|r| (r.user_id.clone(), r.job_creation_timestamp));
        assert_eq!(scanned, expected);
    }

    #[tokio::test]
    async fn user_query_returns_jobs_since_the_cutoff_in_order() {
        let (_, table) = _table().await;
        table.put_all(&jobs::sample_reports()).await;

        let condition = jobs::by_user_since("FirstUser", jobs::default_since()).unwrap();
        let found = table.query(&condition).await.unwrap();

        let created: Vec<_> = found.iter().map(|r| r.job_creation_timestamp).collect();
        assert_eq!(created, vec![jobs::day(2024, 6, 4), jobs::day(2024, 6, 5)]);
        assert_eq!(found[0].job_status, JobStatus::Processing);
    }

    #[tokio::test]
    async fn status_index_query_finds_unprocessed_jobs() {
        let (_, table) = _table().await;
        table.put_all(&jobs::sample_reports()).await;

        let condition = jobs::by_status_since(JobStatus::Unprocessed, jobs::default_since()).unwrap();
        let found = table.query_index(jobs::STATUS_INDEX, &condition).await.unwrap();

        let users: Vec<_> = found.iter().map(|r| r.user_id.as_str()).collect();
        assert_eq!(users, vec!["FirstUser", "ThirdUser", "SecondUser"]);
        assert!(found.iter().all(|r| r.job_status == JobStatus::Unprocessed));
    }

    #[tokio::test]
    async fn absent_fields_are_not_stored() {
        let (store, table) = _table().await;
        table.put_all(&jobs::sample_reports()).await;

        let items = store.scan(jobs::TABLE_NAME).await.unwrap();
        let processed = items
            .iter()
            .find(|item| item.get("JobStatus") == Some(&WireValue::string("Processed")))
            .unwrap();
        let pending = items
            .iter()
            .find(|item| item.get("JobStatus") == Some(&WireValue::string("Processing")))
            .unwrap();

        assert_eq!(processed.len(), 7);
        assert!(!pending.contains_key("ReportS3Bucket"));
        assert!(!pending.values().any(WireValue::is_absent));
    }

    #[tokio::test]
    async fn writing_the_same_key_replaces_the_item() {
        let (_, table) = _table().await;
        let mut report = jobs::sample_reports().remove(1);
        table.put(&report).await.unwrap();

        report.job_status = JobStatus::Processed;
        table.put(&report).await.unwrap();

        let scanned = table.scan().await.unwrap();
        assert_eq!(scanned, vec![report]);
    }

    #[tokio::test]
    async fn unknown_indexes_are_rejected_by_the_store() {
        let (_, table) = _table().await;

        let condition = jobs::by_status_since(JobStatus::Unprocessed, jobs::default_since()).unwrap();
        let error = table.query_index("ByRegion", &condition).await.unwrap_err();

        assert!(matches!(error, Error::Store(StoreError::ValidationFailed { .. })));
    }

    #[tokio::test]
    async fn a_missing_table_is_not_found() {
        let store = Arc::new(MemoryStore::new());
        let table: EntityTable<JobReport, MemoryStore> =
            EntityTable::new(Arc::clone(&store), jobs::TABLE_NAME).unwrap();

        let error = table.scan().await.unwrap_err();
        assert_eq!(error.kind(), ErrorKind::Store);
        assert!(matches!(error, Error::Store(StoreError::ResourceNotFound { .. })));
    }
}

#[cfg(test)]
mod partial_population {
    use std::sync::Arc;

    use ferrum_dynamo::{
        Error,
        lifecycle::{KeyAttribute, TableSchema},
        mapping::{Entity, ModelBuilder},
        store::{EntityTable, MemoryStore, StoreError},
    };

    #[derive(Clone, Debug, Default, PartialEq)]
    struct Reading {
        sensor: String,
        taken_at: Option<i64>,
        celsius: f64,
    }

    impl Entity for Reading {
        const NAME: &'static str = "Reading";

        fn describe(model: &mut ModelBuilder<Self>) {
            model
                .field::<String>("Sensor")
                .get(|reading| &reading.sensor)
                .set(|reading, sensor| reading.sensor = sensor);
            model
                .field::<Option<i64>>("TakenAt")
                .get(|reading| &reading.taken_at)
                .set(|reading, taken_at| reading.taken_at = taken_at);
            model
                .field::<f64>("Celsius")
                .get(|reading| &reading.celsius)
                .set(|reading, celsius| reading.celsius = celsius);
        }
    }

    fn _reading(sensor: &str, taken_at: Option<i64>, celsius: f64) -> Reading {
        Reading {
            sensor: sensor.to_string(),
            taken_at,
            celsius,
        }
    }

    #[tokio::test]
    async fn failed_writes_leave_the_rest_in_place() {
        let schema = TableSchema::builder("Readings", KeyAttribute::string("Sensor"))
            .sort_key(KeyAttribute::number("TakenAt"))
            .build()
            .unwrap();
        let store = Arc::new(MemoryStore::new());
        store.preload(schema, Vec::new()).unwrap();
        let table: EntityTable<Reading, MemoryStore> =
            EntityTable::new(Arc::clone(&store), "Readings").unwrap();

        let readings = vec![
            _reading("north", Some(1), 12.5),
            _reading("north", None, 13.0),
            _reading("south", Some(1), -2.25),
            _reading("south", None, -3.0),
        ];
        let report = table.put_all(&readings).await;

        assert!(!report.is_complete());
        assert_eq!(report.written, 2);
        assert_eq!(report.attempted(), 4);
        assert_eq!(
            report.failures.iter().map(|(position, _)| *position).collect::<Vec<_>>(),
            vec![1, 3]
        );
        assert!(report
            .failures
            .iter()
            .all(|(_, error)| matches!(error, Error::Store(StoreError::ValidationFailed { .. }))));

        let mut stored = table.scan().await.unwrap();
        stored.sort_by(|a, b| a.sensor.cmp(&b.sensor));
        assert_eq!(stored, vec![readings[0].clone(), readings[2].clone()]);
    }
}
