use anyhow::{Context, Result};

use dustspec::loader::CsvSolDirectory;
use dustspec::output::{run_dir_name, write_case};
use dustspec::pipeline::{CaseId, Pipeline};

use super::event::print_case;
use super::{PipelineArgs, Session};

/// Analyse one eventless sol at a fixed local hour
pub fn run(session: &Session, sol: u32, hour: u32, args: &PipelineArgs) -> Result<()> {
    let config = args.resolve(session.file.as_ref())?;
    let catalog = session.optional_catalog()?;
    if let Some(catalog) = &catalog {
        if catalog.event_sols().contains(&sol) {
            log::warn!("Sol {} has cataloged events; the baseline may not be quiet", sol);
        }
    }
    let source = CsvSolDirectory::new(session.data_dir());

    let pipeline = Pipeline::new(catalog.as_ref(), &source, config);
    let output = pipeline
        .run_case(CaseId::QuietSol { sol, hour })
        .with_context(|| format!("Sol {} could not be analysed", sol))?;

    let run_dir = args.output_dir(session.file.as_ref()).join(run_dir_name(pipeline.config()));
    let path = write_case(&run_dir, &output)?;
    print_case(&output);
    println!("Written to: {}", path.display());
    Ok(())
}
