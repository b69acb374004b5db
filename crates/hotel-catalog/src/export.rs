//! Tabular export of scan results

use std::io::Write;

use hotel_dedup::DuplicateCluster;
use serde::Serialize;

use crate::scan::DescriptionIssue;

pub const CLUSTER_HEADERS: [&str; 6] =
    ["Hotel name", "ID 1", "ID 2", "Address", "Score", "Reason"];
pub const ISSUE_HEADERS: [&str; 3] = ["Hotel name", "ID", "Stars"];

/// One row per duplicate group; `ID 2` lists the remaining members
pub fn write_clusters_csv<W: Write>(writer: W, clusters: &[DuplicateCluster]) -> csv::Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(CLUSTER_HEADERS)?;
    for cluster in clusters {
        let others = cluster
            .other_ids()
            .iter()
            .map(|id| id.to_string())
            .collect::<Vec<_>>()
            .join(", ");
        let primary = cluster.primary_id().to_string();
        let score = format!("{:.3}", cluster.confidence);
        wtr.write_record([
            cluster.hotel_name.as_str(),
            primary.as_str(),
            others.as_str(),
            cluster.address.as_str(),
            score.as_str(),
            cluster.reason.as_str(),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_issues_csv<W: Write>(writer: W, issues: &[DescriptionIssue]) -> csv::Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(ISSUE_HEADERS)?;
    for issue in issues {
        let id = issue.hotel_id.to_string();
        wtr.write_record([issue.name.as_str(), id.as_str(), issue.stars.as_str()])?;
    }
    wtr.flush()?;
    Ok(())
}

/// Pretty-printed JSON
pub fn write_json<W: Write, T: Serialize + ?Sized>(writer: W, value: &T) -> serde_json::Result<()> {
    serde_json::to_writer_pretty(writer, value)
}
