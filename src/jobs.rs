//! The job-report table the `ferrum` binary works against.
//!
//! One item per report job, keyed by user and job creation time, with a
//! secondary index on job status so unprocessed jobs can be found without a
//! scan.

use std::fmt::Display;

use chrono::{DateTime, TimeZone, Utc};

use crate::error::Result;
use crate::lifecycle::{KeyAttribute, SecondaryIndex, TableSchema};
use crate::mapping::{Entity, ModelBuilder, NativeType, ScalarValue, WireValue, codec};
use crate::store::{KeyCondition, SortCondition};

pub const TABLE_NAME: &str = "JobStatus";
pub const STATUS_INDEX: &str = "JobStatusIndex";

pub const USER_ID: &str = "UserId";
pub const JOB_CREATION_TIMESTAMP: &str = "JobCreationTimestamp";
pub const JOB_STATUS: &str = "JobStatus";

crate::wire_enum! {
    /// Where a report job is in its processing.
    pub enum JobStatus {
        Unprocessed,
        Processing,
        Processed,
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct JobReport {
    pub user_id: String,
    pub job_creation_timestamp: DateTime<Utc>,
    pub job_status: JobStatus,
    pub report_s3_bucket: Option<String>,
    pub report_s3_key: Option<String>,
    pub report_creation_timestamp: Option<DateTime<Utc>>,
    pub filter_parameters: Option<String>,
}

impl Entity for JobReport {
    const NAME: &'static str = "JobReport";

    fn describe(model: &mut ModelBuilder<Self>) {
        model
            .field::<String>(USER_ID)
            .get(|report| &report.user_id)
            .set(|report, value| report.user_id = value)
            .required();
        model
            .field::<DateTime<Utc>>(JOB_CREATION_TIMESTAMP)
            .get(|report| &report.job_creation_timestamp)
            .set(|report, value| report.job_creation_timestamp = value)
            .required();
        model
            .field::<JobStatus>(JOB_STATUS)
            .get(|report| &report.job_status)
            .set(|report, value| report.job_status = value)
            .required();
        model
            .field::<Option<String>>("ReportS3Bucket")
            .get(|report| &report.report_s3_bucket)
            .set(|report, value| report.report_s3_bucket = value);
        model
            .field::<Option<String>>("ReportS3Key")
            .get(|report| &report.report_s3_key)
            .set(|report, value| report.report_s3_key = value);
        model
            .field::<Option<DateTime<Utc>>>("ReportCreationTimestamp")
            .get(|report| &report.report_creation_timestamp)
            .set(|report, value| report.report_creation_timestamp = value);
        model
            .field::<Option<String>>("FilterParameters")
            .get(|report| &report.filter_parameters)
            .set(|report, value| report.filter_parameters = value);
    }
}

impl Display for JobReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let optional = |value: &Option<String>| value.clone().unwrap_or_else(|| "-".to_string());

        write!(
            f,
            "{} | {} | {} | {}/{} | {} | {}",
            self.user_id,
            self.job_creation_timestamp.format("%Y-%m-%d %H:%M:%S"),
            self.job_status,
            optional(&self.report_s3_bucket),
            optional(&self.report_s3_key),
            self.report_creation_timestamp
                .map(|ts| ts.format("%Y-%m-%d %H:%M:%S").to_string())
                .unwrap_or_else(|| "-".to_string()),
            optional(&self.filter_parameters),
        )
    }
}

pub fn schema() -> Result<TableSchema> {
    //! `UserId` + `JobCreationTimestamp` as the primary key, and
    //! `JobStatusIndex` over `JobStatus` + `JobCreationTimestamp`.

    TableSchema::builder(TABLE_NAME, KeyAttribute::string(USER_ID))
        .sort_key(KeyAttribute::number(JOB_CREATION_TIMESTAMP))
        .capacity(5, 5)
        .index(
            SecondaryIndex::new(STATUS_INDEX, KeyAttribute::string(JOB_STATUS))
                .sort_key(KeyAttribute::number(JOB_CREATION_TIMESTAMP))
                .capacity(5, 5),
        )
        .build()
}

pub fn day(year: i32, month: u32, day: u32) -> DateTime<Utc> {
    //! Midnight UTC on the given date; the Unix epoch for a date that does not
    //! exist.

    Utc.with_ymd_and_hms(year, month, day, 0, 0, 0)
        .single()
        .unwrap_or_default()
}

pub fn default_since() -> DateTime<Utc> {
    day(2024, 6, 4)
}

pub fn sample_reports() -> Vec<JobReport> {
    //! Five reports across three users, one already processed.

    let pending = |user: &str, created: DateTime<Utc>, status: JobStatus, filter: &str| JobReport {
        user_id: user.to_string(),
        job_creation_timestamp: created,
        job_status: status,
        filter_parameters: Some(filter.to_string()),
        ..JobReport::default()
    };

    vec![
        JobReport {
            user_id: "FirstUser".to_string(),
            job_creation_timestamp: day(2024, 6, 1),
            job_status: JobStatus::Processed,
            report_s3_bucket: Some("bucket".to_string()),
            report_s3_key: Some("key1".to_string()),
            report_creation_timestamp: Some(day(2024, 6, 2)),
            filter_parameters: Some("random data".to_string()),
        },
        pending("FirstUser", day(2024, 6, 5), JobStatus::Unprocessed, "random data2"),
        pending("SecondUser", day(2024, 6, 7), JobStatus::Unprocessed, "random data3"),
        pending("ThirdUser", day(2024, 6, 6), JobStatus::Unprocessed, "random data4"),
        pending("FirstUser", day(2024, 6, 4), JobStatus::Processing, "random data3"),
    ]
}

pub fn by_user_since(user_id: &str, since: DateTime<Utc>) -> Result<KeyCondition> {
    //! A user's jobs created at or after `since`, against the base table.

    Ok(KeyCondition::partition(USER_ID, WireValue::string(user_id))
        .sort(JOB_CREATION_TIMESTAMP, SortCondition::Ge(timestamp(since)?)))
}

pub fn by_status_since(status: JobStatus, since: DateTime<Utc>) -> Result<KeyCondition> {
    //! Jobs in `status` created at or after `since`, against
    //! [`STATUS_INDEX`].

    Ok(KeyCondition::partition(JOB_STATUS, WireValue::string(status.name()))
        .sort(JOB_CREATION_TIMESTAMP, SortCondition::Ge(timestamp(since)?)))
}

fn timestamp(value: DateTime<Utc>) -> Result<WireValue> {
    codec::encode(NativeType::Timestamp, &ScalarValue::Timestamp(value))
}
