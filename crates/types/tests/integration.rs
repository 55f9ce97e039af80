//! Integration tests for types

#[cfg(test)]
mod tests {
    use lastore_types::*;
    use proptest::prelude::*;

    #[test]
    fn test_job_info_serialization() {
        let info = JobInfo {
            id: JobId::new(3),
            package_id: PackageId::new("pkg-A"),
            job_type: JobType::Install,
            status: JobStatus::RUNNING,
            progress: 0.5,
            description: "unpacking".into(),
            create_time: 10,
            object_path: "/org/deepin/lastore/Job3".into(),
        };
        let json = serde_json::to_value(&info).unwrap();
        assert_eq!(json["id"], 3);
        assert_eq!(json["packageId"], "pkg-A");
        assert_eq!(json["type"], "install");
        assert_eq!(json["status"], "running");
        assert_eq!(json["createTime"], 10);

        let back: JobInfo = serde_json::from_value(json).unwrap();
        assert_eq!(back, info);
    }

    #[test]
    fn test_progress_report_without_progress_deserializes() {
        let json = r#"{"job_id":5,"description":"","status":"running"}"#;
        let report: ProgressReport = serde_json::from_str(json).unwrap();
        assert_eq!(report.job_id, JobId::new(5));
        assert_eq!(report.status, JobStatus::RUNNING);
        assert!(report.progress.is_none());
    }

    #[test]
    fn test_property_names() {
        assert_eq!(JobProperty::PackageId.as_str(), "PackageId");
        assert_eq!(JobProperty::CreateTime.to_string(), "CreateTime");
    }

    proptest! {
        #[test]
        fn wire_progress_is_in_range_or_absent(raw in -2.0f64..3.0) {
            let report = ProgressReport::from_wire(
                JobId::new(1),
                String::new(),
                JobStatus::RUNNING,
                raw,
            );
            if let Some(progress) = report.progress {
                prop_assert!((0.0..=1.0).contains(&progress));
            }
        }
    }
}
