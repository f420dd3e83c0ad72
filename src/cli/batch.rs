use anyhow::{bail, Result};
use log::{info, warn};

use dustspec::catalog::{EventCatalog, EventFilter, LAST_MISSION_SOL, QUIET_SOLS_WITH_DATA};
use dustspec::loader::CsvSolDirectory;
use dustspec::output::write_batch;
use dustspec::pipeline::{CaseId, Pipeline};

use super::{PipelineArgs, SelectionArgs, Session};

/// Population a batch runs over.
enum Selection {
    Events(EventFilter),
    Quiet { hour: u32, all: bool },
}

impl Selection {
    fn from_args(args: &SelectionArgs) -> Result<Self> {
        let mut chosen = Vec::new();
        if let Some(limit) = args.pressure_drop {
            chosen.push(Selection::Events(EventFilter::PressureDropBelow(limit)));
        }
        if let (Some(min_temperature), Some(max_wind_speed)) = (args.temperature, args.wind) {
            chosen.push(Selection::Events(EventFilter::TemperatureAndWind {
                min_temperature,
                max_wind_speed,
            }));
        }
        if let Some(ls) = args.season {
            chosen.push(Selection::Events(EventFilter::Season(ls)));
        }
        if let Some(ids) = &args.ids {
            chosen.push(Selection::Events(EventFilter::Ids(ids.clone())));
        }
        if let Some(hour) = args.quiet_hour {
            chosen.push(Selection::Quiet {
                hour,
                all: args.all_quiet_sols,
            });
        }

        match chosen.len() {
            1 => Ok(chosen.remove(0)),
            0 => bail!("Choose a population: --pressure-drop, --temperature/--wind, --season, --ids or --quiet-hour"),
            _ => bail!("Only one population selector may be given"),
        }
    }

    fn label(&self) -> String {
        match self {
            Selection::Events(filter) => filter.label(),
            Selection::Quiet { hour, all: false } => format!("quiet_{:02}h", hour),
            Selection::Quiet { hour, all: true } => format!("quiet_all_{:02}h", hour),
        }
    }

    fn cases(&self, catalog: Option<&EventCatalog>) -> Result<Vec<CaseId>> {
        match self {
            Selection::Events(filter) => {
                let Some(catalog) = catalog else {
                    bail!("Event populations need a catalog");
                };
                Ok(catalog.select(filter).into_iter().map(CaseId::Event).collect())
            }
            Selection::Quiet { hour, all } => {
                let sols = match (all, catalog) {
                    (true, Some(catalog)) => catalog.quiet_sols(LAST_MISSION_SOL),
                    (true, None) => bail!("--all-quiet-sols needs a catalog"),
                    (false, _) => QUIET_SOLS_WITH_DATA.to_vec(),
                };
                Ok(sols.into_iter().map(|sol| CaseId::QuietSol { sol, hour: *hour }).collect())
            }
        }
    }
}

/// Aggregate a population and write the run directory
pub fn run(session: &Session, selection: &SelectionArgs, args: &PipelineArgs, per_case: bool) -> Result<()> {
    let selection = Selection::from_args(selection)?;
    let config = args.resolve(session.file.as_ref())?;

    let catalog = match &selection {
        Selection::Events(_) => Some(session.require_catalog()?),
        Selection::Quiet { all, .. } if *all => Some(session.require_catalog()?),
        Selection::Quiet { .. } => session.optional_catalog()?,
    };
    let cases = selection.cases(catalog.as_ref())?;
    let label = selection.label();
    if cases.is_empty() {
        bail!("Selection '{}' matched no cases", label);
    }

    info!("Selection {}: {} cases, preset {}", label, cases.len(), args.preset());
    let source = CsvSolDirectory::new(session.data_dir());
    let pipeline = Pipeline::new(catalog.as_ref(), &source, config);
    let outcome = pipeline.run_batch_titled(&label, &cases)?;

    #[cfg(feature = "colorized_output")]
    {
        println!("{}", outcome.report.format_colored());
    }

    #[cfg(not(feature = "colorized_output"))]
    {
        println!("{}", outcome.report);
    }

    if outcome.report.skipped_count() > 0 {
        warn!("{} of {} cases skipped", outcome.report.skipped_count(), cases.len());
    }

    let run_dir = write_batch(
        &args.output_dir(session.file.as_ref()).join(&label),
        &label,
        pipeline.config(),
        &outcome,
        per_case,
    )?;
    println!("Written to: {}", run_dir.display());
    Ok(())
}
