use anyhow::{Context, Result};
use log::info;

use dustspec::loader::CsvSolDirectory;
use dustspec::output::{run_dir_name, write_case};
use dustspec::pipeline::{CaseId, CaseOutput, Pipeline};

use super::{PipelineArgs, Session};

/// Analyse one cataloged event and write its curves
pub fn run(session: &Session, id: u32, args: &PipelineArgs) -> Result<()> {
    let config = args.resolve(session.file.as_ref())?;
    let catalog = session.require_catalog()?;
    let source = CsvSolDirectory::new(session.data_dir());

    info!("Preset: {}", args.preset());
    let pipeline = Pipeline::new(Some(&catalog), &source, config);
    let output = pipeline
        .run_case(CaseId::Event(id))
        .with_context(|| format!("Event {} could not be analysed", id))?;

    let run_dir = args.output_dir(session.file.as_ref()).join(run_dir_name(pipeline.config()));
    let path = write_case(&run_dir, &output)?;
    print_case(&output);
    println!("Written to: {}", path.display());
    Ok(())
}

/// Print a short summary of one case's curves.
pub fn print_case(output: &CaseOutput) {
    println!("Case: {} (sol {})", output.case, output.sol);
    for curve in &output.curves {
        let finite = curve.values.iter().filter(|v| v.is_finite()).count();
        println!("  {:<16} {:>6} bins ({} finite)", curve.name, curve.len(), finite);
    }
    println!("  Border frequency: {:.5} Hz", output.border_frequency);
}
