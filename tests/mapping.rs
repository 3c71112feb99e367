#[cfg(test)]
mod codec {
    use std::str::FromStr;

    use chrono::{DateTime, Duration, TimeZone, Utc};
    use ferrum_dynamo::{
        ErrorKind,
        mapping::{
            NativeType, ScalarValue, WireKind, WireValue,
            codec::{self, UNIX_EPOCH_TICKS},
        },
    };
    use rust_decimal::Decimal;

    ferrum_dynamo::wire_enum! {
        pub enum Colour { Red, Green, Blue }
    }

    fn _round_trip(native: NativeType, value: ScalarValue) {
        let wire = codec::encode(native, &value).unwrap();
        assert_eq!(codec::decode(native, &wire).unwrap(), value, "via {}", wire);
    }

    #[test]
    fn kinds_are_total_over_supported_types() {
        let strings = [NativeType::String, NativeType::Char, NativeType::Enumeration(Colour::CASES)];
        let numbers = [
            NativeType::Int16,
            NativeType::Int32,
            NativeType::Int64,
            NativeType::Float32,
            NativeType::Float64,
            NativeType::Decimal,
            NativeType::Timestamp,
        ];

        for native in strings {
            assert_eq!(codec::kind_of(native).unwrap(), WireKind::String);
        }
        for native in numbers {
            assert_eq!(codec::kind_of(native).unwrap(), WireKind::Number);
        }
    }

    #[test]
    fn unsupported_kinds_are_refused() {
        let unsupported = [
            NativeType::Boolean,
            NativeType::Binary,
            NativeType::List,
            NativeType::Map,
            NativeType::Record,
        ];

        for native in unsupported {
            let error = codec::kind_of(native).unwrap_err();
            assert_eq!(error.kind(), ErrorKind::UnsupportedType);
        }
    }

    #[test]
    fn strings_and_chars_round_trip() {
        _round_trip(NativeType::String, ScalarValue::String(String::new()));
        _round_trip(NativeType::String, ScalarValue::String("random data".to_string()));
        _round_trip(NativeType::Char, ScalarValue::Char('x'));
        _round_trip(NativeType::Char, ScalarValue::Char('é'));
    }

    #[test]
    fn empty_string_is_not_absent() {
        let wire = codec::encode(NativeType::String, &ScalarValue::String(String::new())).unwrap();
        assert_eq!(wire, WireValue::string(""));
        assert!(!wire.is_absent());
    }

    #[test]
    fn integers_round_trip_at_their_limits() {
        for n in [i16::MIN, -1, 0, 1, i16::MAX] {
            _round_trip(NativeType::Int16, ScalarValue::Int16(n));
        }
        for n in [i32::MIN, -1, 0, 1, i32::MAX] {
            _round_trip(NativeType::Int32, ScalarValue::Int32(n));
        }
        for n in [i64::MIN, -1, 0, 1, i64::MAX] {
            _round_trip(NativeType::Int64, ScalarValue::Int64(n));
        }
    }

    #[test]
    fn floats_and_decimals_round_trip() {
        for n in [0.0f32, -1.5, 0.0025, f32::MIN_POSITIVE, f32::MAX] {
            _round_trip(NativeType::Float32, ScalarValue::Float32(n));
        }
        for n in [0.0f64, -273.15, 0.1 + 0.2, 1e-300, f64::MAX] {
            _round_trip(NativeType::Float64, ScalarValue::Float64(n));
        }
        for text in ["0", "-42.5", "123.456789012345678901", "79228162514264337593543950335"] {
            let n = Decimal::from_str(text).unwrap();
            _round_trip(NativeType::Decimal, ScalarValue::Decimal(n));
        }
    }

    #[test]
    fn timestamps_round_trip_across_the_tick_range() {
        let tick_zero = Utc.with_ymd_and_hms(1, 1, 1, 0, 0, 0).unwrap();
        let far_future = Utc.with_ymd_and_hms(9999, 12, 31, 23, 59, 59).unwrap()
            + Duration::nanoseconds(999_999_900);

        for ts in [tick_zero, DateTime::<Utc>::UNIX_EPOCH, far_future] {
            _round_trip(NativeType::Timestamp, ScalarValue::Timestamp(ts));
        }

        let wire = codec::encode(NativeType::Timestamp, &ScalarValue::Timestamp(far_future)).unwrap();
        assert_eq!(wire, WireValue::number("3155378975999999999"));
    }

    #[test]
    fn sub_tick_precision_is_truncated() {
        let ts = DateTime::<Utc>::UNIX_EPOCH + Duration::nanoseconds(199);
        let wire = codec::encode(NativeType::Timestamp, &ScalarValue::Timestamp(ts)).unwrap();

        assert_eq!(wire, WireValue::number((UNIX_EPOCH_TICKS + 1).to_string()));
    }

    #[test]
    fn every_enumeration_case_round_trips_by_name() {
        let native = NativeType::Enumeration(Colour::CASES);

        for name in Colour::CASES {
            let wire = codec::encode(native, &ScalarValue::Enumeration(*name)).unwrap();
            assert_eq!(wire, WireValue::string(*name));
            _round_trip(native, ScalarValue::Enumeration(*name));
        }
    }

    #[test]
    fn numeric_formatting_is_idempotent() {
        let values = [
            (NativeType::Float64, ScalarValue::Float64(1234567.125)),
            (NativeType::Float32, ScalarValue::Float32(-0.5)),
            (NativeType::Decimal, ScalarValue::Decimal(Decimal::new(-12345, 3))),
            (NativeType::Int64, ScalarValue::Int64(9_000_000_000)),
        ];

        for (native, value) in values {
            let first = codec::encode(native, &value).unwrap();
            let second = codec::encode(native, &value).unwrap();
            assert_eq!(first, second);
        }

        let wire = codec::encode(NativeType::Float64, &ScalarValue::Float64(1234567.125)).unwrap();
        assert_eq!(wire, WireValue::number("1234567.125"));

        let wire = codec::encode(NativeType::Decimal, &ScalarValue::Decimal(Decimal::new(-12345, 3)))
            .unwrap();
        assert_eq!(wire, WireValue::number("-12.345"));
    }

    #[test]
    fn a_string_variant_for_a_number_is_a_type_mismatch() {
        let error = codec::decode(NativeType::Int32, &WireValue::string("12")).unwrap_err();
        assert_eq!(error.kind(), ErrorKind::WireTypeMismatch);

        let error = codec::decode(NativeType::String, &WireValue::number("12")).unwrap_err();
        assert_eq!(error.kind(), ErrorKind::WireTypeMismatch);
    }

    #[test]
    fn unparsable_payloads_are_format_errors() {
        let cases = [
            (NativeType::Int16, WireValue::number("40000")),
            (NativeType::Int64, WireValue::number("twelve")),
            (NativeType::Float64, WireValue::number("1,5")),
            (NativeType::Decimal, WireValue::number("")),
            (NativeType::Timestamp, WireValue::number("-1")),
            (NativeType::Char, WireValue::string("ab")),
            (NativeType::Char, WireValue::string("")),
            (NativeType::Enumeration(Colour::CASES), WireValue::string("red")),
            (NativeType::Enumeration(Colour::CASES), WireValue::string("Purple")),
        ];

        for (native, wire) in cases {
            let error = codec::decode(native, &wire).unwrap_err();
            assert_eq!(error.kind(), ErrorKind::WireFormatError, "{} from {}", native, wire);
        }
    }

    #[test]
    fn generated_enums_parse_and_print_their_case_names() {
        assert_eq!(Colour::default(), Colour::Red);
        assert_eq!(Colour::Blue.to_string(), "Blue");
        assert_eq!("Green".parse::<Colour>().unwrap(), Colour::Green);
        assert_eq!("green".parse::<Colour>().unwrap_err().kind(), ErrorKind::WireFormatError);
    }
}

#[cfg(test)]
mod entity {
    use std::sync::Arc;

    use chrono::{DateTime, Duration, Utc};
    use ferrum_dynamo::{
        Error, ErrorKind,
        mapping::{
            Entity, EntityMapper, Item, MapperRegistry, ModelBuilder, NativeType, WireKind, WireValue,
            mapper_for,
        },
    };

    ferrum_dynamo::wire_enum! {
        pub enum Status { Unprocessed, Processing, Processed }
    }

    #[derive(Clone, Debug, Default, PartialEq)]
    struct Job {
        id: String,
        created_at: DateTime<Utc>,
        status: Status,
    }

    impl Entity for Job {
        const NAME: &'static str = "Job";

        fn describe(model: &mut ModelBuilder<Self>) {
            model
                .field::<String>("id")
                .get(|job| &job.id)
                .set(|job, id| job.id = id)
                .required();
            model
                .field::<DateTime<Utc>>("createdAt")
                .get(|job| &job.created_at)
                .set(|job, created_at| job.created_at = created_at);
            model
                .field::<Status>("status")
                .get(|job| &job.status)
                .set(|job, status| job.status = status);
        }
    }

    #[derive(Clone, Debug, Default, PartialEq)]
    struct Account {
        owner: Option<String>,
        nickname: Option<String>,
        balance: rust_decimal::Decimal,
        logins: i32,
        initial: char,
    }

    impl Entity for Account {
        const NAME: &'static str = "Account";

        fn describe(model: &mut ModelBuilder<Self>) {
            model
                .field::<Option<String>>("Owner")
                .get(|account| &account.owner)
                .set(|account, owner| account.owner = owner)
                .required();
            model
                .field::<Option<String>>("Nickname")
                .get(|account| &account.nickname)
                .set(|account, nickname| account.nickname = nickname);
            model
                .field::<rust_decimal::Decimal>("Balance")
                .get(|account| &account.balance)
                .set(|account, balance| account.balance = balance);
            model
                .field::<i32>("Logins")
                .get(|account| &account.logins)
                .set(|account, logins| account.logins = logins);
            model
                .field::<char>("Initial")
                .get(|account| &account.initial)
                .set(|account, initial| account.initial = initial);
        }
    }

    #[derive(Default)]
    struct Flagged {
        id: String,
        active: bool,
    }

    impl Entity for Flagged {
        const NAME: &'static str = "Flagged";

        fn describe(model: &mut ModelBuilder<Self>) {
            model
                .field::<String>("Id")
                .get(|flagged| &flagged.id)
                .set(|flagged, id| flagged.id = id);
            model
                .field::<bool>("Active")
                .get(|flagged| &flagged.active)
                .set(|flagged, active| flagged.active = active);
        }
    }

    #[derive(Default)]
    struct ReadOnly {
        id: String,
    }

    impl Entity for ReadOnly {
        const NAME: &'static str = "ReadOnly";

        fn describe(model: &mut ModelBuilder<Self>) {
            model.field::<String>("Id").get(|record| &record.id);
        }
    }

    #[derive(Default)]
    struct WriteOnly {
        id: String,
    }

    impl Entity for WriteOnly {
        const NAME: &'static str = "WriteOnly";

        fn describe(model: &mut ModelBuilder<Self>) {
            model.field::<String>("Id").set(|record, id| record.id = id);
        }
    }

    #[derive(Default)]
    struct Twice {
        id: String,
    }

    impl Entity for Twice {
        const NAME: &'static str = "Twice";

        fn describe(model: &mut ModelBuilder<Self>) {
            for _ in 0..2 {
                model
                    .field::<String>("Id")
                    .get(|record| &record.id)
                    .set(|record, id| record.id = id);
            }
        }
    }

    fn _job() -> Job {
        Job {
            id: "u1".to_string(),
            created_at: DateTime::<Utc>::UNIX_EPOCH + Duration::days(1),
            status: Status::Processing,
        }
    }

    fn _item(pairs: &[(&str, WireValue)]) -> Item {
        pairs
            .iter()
            .map(|(name, value)| (name.to_string(), value.clone()))
            .collect()
    }

    #[test]
    fn end_to_end_job_encodes_and_decodes() {
        let mapper = EntityMapper::<Job>::new().unwrap();

        let item = mapper.encode_record(&_job()).unwrap();
        let expected = _item(&[
            ("id", WireValue::string("u1")),
            ("createdAt", WireValue::number("621356832000000000")),
            ("status", WireValue::string("Processing")),
        ]);

        assert_eq!(item, expected);
        assert_eq!(mapper.decode_record(&item).unwrap(), _job());
    }

    #[test]
    fn fields_keep_declaration_order_and_kinds() {
        let mapper = EntityMapper::<Job>::new().unwrap();

        assert_eq!(mapper.field_names(), vec!["id", "createdAt", "status"]);

        let created_at = mapper.field("createdAt").unwrap();
        assert_eq!(created_at.native_type(), NativeType::Timestamp);
        assert_eq!(created_at.wire_kind(), WireKind::Number);
        assert!(!created_at.is_required());
        assert!(mapper.field("id").unwrap().is_required());
    }

    #[test]
    fn debug_output_lists_the_bound_fields() {
        let mapper = EntityMapper::<Job>::new().unwrap();
        let printed = format!("{:?}", mapper);

        assert!(printed.starts_with("EntityMapper"));
        assert!(printed.contains("\"Job\""));
        assert!(printed.contains("createdAt"));
        assert!(printed.contains("Timestamp"));
    }

    #[test]
    fn unknown_field_lookup_fails() {
        let mapper = EntityMapper::<Job>::new().unwrap();
        assert_eq!(mapper.field("owner").unwrap_err().kind(), ErrorKind::FieldNotFound);
    }

    #[test]
    fn encode_always_yields_every_field() {
        let mapper = EntityMapper::<Account>::new().unwrap();
        let account = Account {
            owner: Some("Jansen".to_string()),
            ..Account::default()
        };

        let item = mapper.encode_record(&account).unwrap();

        assert_eq!(item.keys().map(String::as_str).collect::<Vec<_>>(), mapper.field_names());
        assert_eq!(item["Nickname"], WireValue::Absent);
        assert_eq!(item["Balance"], WireValue::number("0"));
        assert_eq!(item["Logins"], WireValue::number("0"));
        assert_eq!(item["Initial"], WireValue::string("\0"));
    }

    #[test]
    fn store_items_leave_absent_fields_out() {
        let mapper = EntityMapper::<Account>::new().unwrap();
        let account = Account {
            owner: Some("Jansen".to_string()),
            ..Account::default()
        };

        let item = mapper.to_store_item(&account).unwrap();

        assert!(!item.contains_key("Nickname"));
        assert_eq!(item.len(), mapper.len() - 1);
    }

    #[test]
    fn a_required_field_without_a_value_cannot_be_encoded() {
        let mapper = EntityMapper::<Account>::new().unwrap();

        let error = mapper.encode_record(&Account::default()).unwrap_err();
        assert!(matches!(
            error,
            Error::NullFieldValue { ref field, .. } if field == "Owner"
        ));
    }

    #[test]
    fn unknown_attributes_are_ignored() {
        let mapper = EntityMapper::<Job>::new().unwrap();
        let mut item = mapper.encode_record(&_job()).unwrap();
        item.insert("introducedLater".to_string(), WireValue::string("v2"));

        assert_eq!(mapper.decode_record(&item).unwrap(), _job());
    }

    #[test]
    fn missing_required_attribute_fails_decode() {
        let mapper = EntityMapper::<Job>::new().unwrap();
        let mut item = mapper.encode_record(&_job()).unwrap();
        item.shift_remove("id");

        let error = mapper.decode_record(&item).unwrap_err();
        assert!(matches!(
            error,
            Error::RequiredFieldMissing { ref entity, ref field } if entity == "Job" && field == "id"
        ));
    }

    #[test]
    fn missing_optional_attributes_keep_their_defaults() {
        let mapper = EntityMapper::<Job>::new().unwrap();
        let item = _item(&[("id", WireValue::string("u2")), ("status", WireValue::Absent)]);

        let job = mapper.decode_record(&item).unwrap();
        assert_eq!(
            job,
            Job {
                id: "u2".to_string(),
                ..Job::default()
            }
        );
    }

    #[test]
    fn wrong_variant_fails_decode_with_the_field_named() {
        let mapper = EntityMapper::<Job>::new().unwrap();
        let mut item = mapper.encode_record(&_job()).unwrap();
        item.insert("createdAt".to_string(), WireValue::string("621356832000000000"));

        let error = mapper.decode_record(&item).unwrap_err();
        assert_eq!(error.kind(), ErrorKind::WireTypeMismatch);
        assert!(error.to_string().contains("createdAt"));
    }

    #[test]
    fn unknown_enumeration_name_fails_decode() {
        let mapper = EntityMapper::<Job>::new().unwrap();
        let mut item = mapper.encode_record(&_job()).unwrap();
        item.insert("status".to_string(), WireValue::string("processing"));

        let error = mapper.decode_record(&item).unwrap_err();
        assert!(matches!(
            error,
            Error::WireFormat { field: Some(ref field), .. } if field == "status"
        ));
    }

    #[test]
    fn unsupported_field_types_fail_model_construction() {
        let error = EntityMapper::<Flagged>::new().unwrap_err();

        assert_eq!(error.kind(), ErrorKind::ModelConstructionError);
        assert!(matches!(
            error.root_cause(),
            Error::UnsupportedType { native, field: Some(field) } if native == "bool" && field == "Active"
        ));
    }

    #[test]
    fn fields_must_be_readable_and_writable() {
        let error = EntityMapper::<ReadOnly>::new().unwrap_err();
        assert_eq!(error.root_cause().kind(), ErrorKind::FieldNotWritable);

        let error = EntityMapper::<WriteOnly>::new().unwrap_err();
        assert_eq!(error.root_cause().kind(), ErrorKind::FieldNotReadable);
    }

    #[test]
    fn duplicate_field_names_fail_model_construction() {
        let error = EntityMapper::<Twice>::new().unwrap_err();
        assert_eq!(error.root_cause().kind(), ErrorKind::DuplicateField);
    }

    #[test]
    fn mappers_are_built_once_per_type() {
        let first = mapper_for::<Job>().unwrap();
        let second = mapper_for::<Job>().unwrap();

        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn a_registry_holds_one_mapper_per_type() {
        let registry = MapperRegistry::new();
        assert!(registry.is_empty());

        registry.get_or_build::<Job>().unwrap();
        registry.get_or_build::<Job>().unwrap();
        registry.get_or_build::<Account>().unwrap();

        assert_eq!(registry.len(), 2);
        assert!(registry.contains::<Job>());
        assert!(!registry.contains::<Flagged>());
    }

    #[test]
    fn a_registry_hands_back_the_mapper_it_cached() {
        let registry = MapperRegistry::new();

        let built = registry.get_or_build::<Job>().unwrap();
        let cached = registry.get_or_build::<Job>().unwrap();

        assert!(Arc::ptr_eq(&built, &cached));
        assert_eq!(cached.decode_record(&built.encode_record(&_job()).unwrap()).unwrap(), _job());
        assert!(registry.get_or_build::<Flagged>().is_err());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn failed_models_are_not_cached() {
        assert!(mapper_for::<Flagged>().is_err());
        assert!(mapper_for::<Flagged>().is_err());
    }

    #[test]
    fn a_shared_mapper_serves_concurrent_calls() {
        let mapper = mapper_for::<Account>().unwrap();

        let handles: Vec<_> = (0..8)
            .map(|n| {
                let mapper = Arc::clone(&mapper);
                std::thread::spawn(move || {
                    let account = Account {
                        owner: Some(format!("owner-{}", n)),
                        logins: n,
                        initial: 'a',
                        ..Account::default()
                    };
                    let item = mapper.encode_record(&account).unwrap();
                    assert_eq!(mapper.decode_record(&item).unwrap(), account);
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }
    }
}
