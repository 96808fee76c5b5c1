//! Report variants
//!
//! Each variant is a pure declaration of a query plus its column schema.
//! The closed enum makes an incomplete variant unrepresentable: a new
//! report without a query or columns does not compile.

use crate::table::Table;

/// Checkpoint-type gap report: for a project, result-type/checkpoint-type
/// pairs that appear among its declared relationships but were never
/// observed among its recorded checkpoints (anti-join over the expected
/// pair set).
const CHECKPOINT_TYPE_GAPS_QUERY: &str = r#"
    with type_pairs (result_type_id, cp_type_id,
        result_name, result_type_name, cp_type_name) as (
        select distinct
            MuFpResults.ResultType,
            type_checkpoints.type_check_id,
            MuFpResults.rfp_name,
            type_results.parent_rt_name,
            type_checkpoints.type_check_name
        from MuFpResults
        join type_results on type_results.parent_rt_id = MuFpResults.ResultType
        join MuFpCheckpoints on MuFpCheckpoints.rfp_id = MuFpResults.rfp_id
        join type_checkpoints on type_checkpoints.type_check_id = MuFpCheckpoints.type
        where MuFpResults.fp_id = %(fp_id)s
    )

    select distinct
        type_pairs.result_name,
        summary_table.parent_rt_id as result_type_id,
        type_results.parent_rt_name as result_type_name,
        summary_table.type_check_id as checkpoint_type_id,
        type_checkpoints.type_check_name as checkpoint_type_name
    from
        (select distinct
            cp_types.parent_rt_id,
            cp_types.type_check_id,
            type_pairs.cp_type_id
        from cp_types
        left join type_pairs on
            type_pairs.result_type_id = cp_types.parent_rt_id and
            type_pairs.cp_type_id = cp_types.type_check_id
        where cp_types.parent_rt_id in
            (select distinct type_pairs.result_type_id from type_pairs)
        ) summary_table

    join type_results on type_results.parent_rt_id = summary_table.parent_rt_id
    join type_checkpoints on type_checkpoints.type_check_id = summary_table.type_check_id
    join type_pairs on type_pairs.result_type_id = summary_table.parent_rt_id
    where summary_table.cp_type_id is null
"#;

const CHECKPOINT_TYPE_GAPS_COLUMNS: &[&str] = &[
    "result_name",
    "result_type_id",
    "result_type_name",
    "checkpoint_type_id",
    "checkpoint_type_name",
];

/// Checkpoint shortfall by year: for a project, restricted to results with
/// at least one indicator dated after 2020-12-31, checkpoint counts per
/// result per end-year, keeping only year-buckets with fewer than six
/// checkpoints; ordered by result then year.
const CHECKPOINT_SHORTFALL_QUERY: &str = r#"
    with indicators (rfp_id) as (
        select distinct
            rfp_id
        from fp_result_indicators
        where date > '2020-12-31T00:00:00'
    )

    select
        fed_project.fp_name,
        fed_project.fp_code,
        MuFpResults.rfp_name,
        count(MuFpCheckpoints.check_point_name) as number_of_checkpoints,
        substr(MuFpCheckpoints.check_point_end_date, 1, 4) as end_year
    from MuFpResults
    join MuFpCheckpoints on MuFpCheckpoints.rfp_id = MuFpResults.rfp_id
    join fed_project on fed_project.fp_id = MuFpResults.fp_id
    where MuFpResults.fp_id = %(fp_id)s
        and MuFpResults.rfp_id in (select rfp_id from indicators)

    group by
        MuFpCheckpoints.rfp_id,
        fed_project.fp_name,
        fed_project.fp_code,
        MuFpResults.rfp_name,
        end_year
    having count(MuFpCheckpoints.check_point_name) < 6

    order by
        MuFpCheckpoints.rfp_id,
        end_year
"#;

// The declared columns predate the query's current five-column projection
// (there is no start_year alias in it). The mismatch is caught by the
// arity check at fetch time rather than papered over here.
const CHECKPOINT_SHORTFALL_COLUMNS: &[&str] =
    &["result_name", "num_checkpoints", "start_year", "end_year"];

/// The closed set of report variants
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Report {
    /// Expected checkpoint types never observed for a project's results
    CheckpointTypeGaps,
    /// Per-year checkpoint counts below the reporting threshold
    CheckpointShortfallByYear,
}

impl Report {
    /// Short name used in logs and error context
    pub fn name(&self) -> &'static str {
        match self {
            Report::CheckpointTypeGaps => "checkpoint_type_gaps",
            Report::CheckpointShortfallByYear => "checkpoint_shortfall_by_year",
        }
    }

    /// The variant's parameterized query
    pub fn query(&self) -> &'static str {
        match self {
            Report::CheckpointTypeGaps => CHECKPOINT_TYPE_GAPS_QUERY,
            Report::CheckpointShortfallByYear => CHECKPOINT_SHORTFALL_QUERY,
        }
    }

    /// The variant's declared column schema, in projection order
    pub fn columns(&self) -> &'static [&'static str] {
        match self {
            Report::CheckpointTypeGaps => CHECKPOINT_TYPE_GAPS_COLUMNS,
            Report::CheckpointShortfallByYear => CHECKPOINT_SHORTFALL_COLUMNS,
        }
    }

    /// Reshape the produced table
    ///
    /// Identity for every current variant. Must stay pure: no I/O, and the
    /// output shape must match the declared columns.
    pub fn postprocess(&self, table: Table) -> Table {
        match self {
            Report::CheckpointTypeGaps | Report::CheckpointShortfallByYear => table,
        }
    }
}
