use crate::model::PipelineReport;
use anyhow::Result;
use std::io::Write;

pub fn write_json<W: Write>(out: &mut W, report: &PipelineReport) -> Result<()> {
    serde_json::to_writer_pretty(&mut *out, report)?;
    writeln!(out)?;
    Ok(())
}
