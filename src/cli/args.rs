//! Pipeline flags shared by the `event`, `quiet` and `batch` commands.

use anyhow::{bail, Result};
use clap::{Args, ValueEnum};
use std::path::PathBuf;

use dustspec::aggregate::{AggregationPolicy, Reduction};
use dustspec::pipeline::{PipelineConfig, Statistic, WindowSpec};
use dustspec::spectral::SpectralKind;

use super::config::Config;
use super::preset::Preset;

/// Analysis preset.
#[derive(Clone, Copy, Debug, Default, ValueEnum)]
pub enum PresetArg {
    /// Power ratio before the event
    #[default]
    Near,
    /// Corrected ratio before the event, 0.5 s grid
    NearMoving,
    /// Corrected ratio after the event, 0.5 s grid
    ReturnAfter,
    /// Amplitude spectrum before the event, 0.5 s grid
    NearAmplitude,
}

impl From<PresetArg> for Preset {
    fn from(arg: PresetArg) -> Self {
        match arg {
            PresetArg::Near => Preset::Near,
            PresetArg::NearMoving => Preset::NearMoving,
            PresetArg::ReturnAfter => Preset::ReturnAfter,
            PresetArg::NearAmplitude => Preset::NearAmplitude,
        }
    }
}

/// Window placement relative to the event.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum WindowArg {
    /// Ends `offset` seconds before the event
    Before,
    /// Starts `offset` seconds after the event
    After,
    /// Ends at the event
    On,
    /// Starts at `--fixed-hour`:00 on the event's sol
    Fixed,
}

/// Spectrum kind.
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum KindArg {
    /// Power spectral density
    Power,
    /// Single-sided amplitude
    Amplitude,
}

impl From<KindArg> for SpectralKind {
    fn from(arg: KindArg) -> Self {
        match arg {
            KindArg::Power => SpectralKind::Power,
            KindArg::Amplitude => SpectralKind::Amplitude,
        }
    }
}

/// Derived statistic.
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum StatisticArg {
    /// Raw spectrum
    Spectrum,
    /// Spectrum and its log-space moving average
    Smoothed,
    /// Spectrum over its moving average, edges trimmed
    Ratio,
    /// Ratio re-smoothed with the ratio window
    CorrectedRatio,
    /// Spectrum and its linear valid-mode moving average
    Moving,
}

impl From<StatisticArg> for Statistic {
    fn from(arg: StatisticArg) -> Self {
        match arg {
            StatisticArg::Spectrum => Statistic::Spectrum,
            StatisticArg::Smoothed => Statistic::Smoothed,
            StatisticArg::Ratio => Statistic::Ratio,
            StatisticArg::CorrectedRatio => Statistic::CorrectedRatio,
            StatisticArg::Moving => Statistic::SmoothedLinear,
        }
    }
}

/// Aggregation policy.
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum PolicyArg {
    /// Drop empty/all-NaN cases and trim to the shortest
    Truncate,
    /// Require equal lengths
    Strict,
}

impl From<PolicyArg> for AggregationPolicy {
    fn from(arg: PolicyArg) -> Self {
        match arg {
            PolicyArg::Truncate => AggregationPolicy::TruncateToShortest,
            PolicyArg::Strict => AggregationPolicy::StrictEqualLength,
        }
    }
}

/// Reduction across cases.
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum ReductionArg {
    /// Mean (NaN-propagating)
    Mean,
    /// Mean ignoring NaN
    Nanmean,
    /// Median (NaN-propagating)
    Median,
    /// Median ignoring NaN
    Nanmedian,
    /// Sum (NaN-propagating)
    Sum,
    /// Maximum (NaN-propagating)
    Max,
}

impl From<ReductionArg> for Reduction {
    fn from(arg: ReductionArg) -> Self {
        match arg {
            ReductionArg::Mean => Reduction::Mean,
            ReductionArg::Nanmean => Reduction::NanMean,
            ReductionArg::Median => Reduction::Median,
            ReductionArg::Nanmedian => Reduction::NanMedian,
            ReductionArg::Sum => Reduction::Sum,
            ReductionArg::Max => Reduction::Max,
        }
    }
}

/// Pipeline flags.
#[derive(Args, Debug, Default)]
pub struct PipelineArgs {
    /// Analysis preset (near, near-moving, return-after, near-amplitude)
    #[arg(short = 'p', long, value_enum)]
    pub preset: Option<PresetArg>,

    /// Window placement
    #[arg(short = 'w', long, value_enum)]
    pub window: Option<WindowArg>,

    /// Window length in seconds
    #[arg(short = 'd', long)]
    pub duration: Option<f64>,

    /// Gap between event and window in seconds
    #[arg(long)]
    pub offset: Option<f64>,

    /// Start hour for the fixed window
    #[arg(long, value_name = "HOUR")]
    pub fixed_hour: Option<u32>,

    /// Resample onto this cadence in seconds
    #[arg(long, value_name = "SECONDS")]
    pub resample: Option<f64>,

    /// Spectrum kind
    #[arg(short = 'k', long, value_enum)]
    pub kind: Option<KindArg>,

    /// Derived statistic
    #[arg(short = 's', long, value_enum)]
    pub statistic: Option<StatisticArg>,

    /// Log-space smoothing window (odd)
    #[arg(long, value_name = "N")]
    pub smoothing_window: Option<usize>,

    /// Ratio re-smoothing window (odd)
    #[arg(long, value_name = "N")]
    pub ratio_window: Option<usize>,

    /// Drop bins at or above this frequency (Hz)
    #[arg(long, value_name = "HZ")]
    pub ceiling: Option<f64>,

    /// Aggregation policy
    #[arg(long, value_enum)]
    pub policy: Option<PolicyArg>,

    /// Reduction across cases
    #[arg(long, value_enum)]
    pub reduction: Option<ReductionArg>,

    /// Output directory
    #[arg(short = 'o', long, value_name = "DIR")]
    pub output: Option<PathBuf>,
}

impl PipelineArgs {
    /// Preset chosen on the command line, or the default.
    pub fn preset(&self) -> Preset {
        self.preset.map(Preset::from).unwrap_or_default()
    }

    /// Merge preset, config file and flags into a validated configuration.
    pub fn resolve(&self, file: Option<&Config>) -> Result<PipelineConfig> {
        let mut config = self.preset().config();
        if let Some(file) = file {
            file.pipeline.apply(&mut config);
        }

        if let Some(window) = self.window {
            let duration = config.window.duration();
            let offset = config.window.offset().unwrap_or(20.0);
            config.window = match window {
                WindowArg::Before => WindowSpec::Before { duration, offset },
                WindowArg::After => WindowSpec::After { duration, offset },
                WindowArg::On => WindowSpec::OnEvent { duration },
                WindowArg::Fixed => {
                    let hour = match (self.fixed_hour, config.window) {
                        (Some(hour), _) => hour,
                        (None, WindowSpec::FixedLocalTime { hour, .. }) => hour,
                        (None, _) => bail!("--window fixed needs --fixed-hour"),
                    };
                    WindowSpec::FixedLocalTime { hour, duration }
                }
            };
        } else if let (Some(hour), WindowSpec::FixedLocalTime { duration, .. }) = (self.fixed_hour, config.window) {
            config.window = WindowSpec::FixedLocalTime { hour, duration };
        }
        if let Some(duration) = self.duration {
            config.window = config.window.with_duration(duration);
        }
        if let Some(offset) = self.offset {
            config.window = config.window.with_offset(offset);
        }

        if self.resample.is_some() {
            config.resample = self.resample;
        }
        if let Some(kind) = self.kind {
            config.kind = kind.into();
        }
        if let Some(statistic) = self.statistic {
            config.statistic = statistic.into();
        }
        if let Some(size) = self.smoothing_window {
            config.smoothing_window = size;
        }
        if let Some(size) = self.ratio_window {
            config.ratio_window = size;
        }
        if self.ceiling.is_some() {
            config.frequency_ceiling = self.ceiling;
        }
        if let Some(policy) = self.policy {
            config.policy = policy.into();
        }
        if let Some(reduction) = self.reduction {
            config.reduction = reduction.into();
        }

        config.validate()?;
        Ok(config)
    }

    /// Output directory from the flag, the config file, or `results`.
    pub fn output_dir(&self, file: Option<&Config>) -> PathBuf {
        self.output
            .clone()
            .or_else(|| file.and_then(|c| c.paths.output_dir.clone()))
            .unwrap_or_else(|| PathBuf::from("results"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_override_file_and_preset() {
        let file = Config::from_str(
            r#"
            [pipeline]
            statistic = "smoothed"
            smoothing_window = 21
            "#,
        )
        .unwrap();
        let args = PipelineArgs {
            preset: Some(PresetArg::ReturnAfter),
            statistic: Some(StatisticArg::Ratio),
            duration: Some(300.0),
            ..Default::default()
        };
        let config = args.resolve(Some(&file)).unwrap();
        assert_eq!(config.statistic, Statistic::Ratio);
        assert_eq!(config.smoothing_window, 21);
        assert_eq!(config.resample, Some(0.5));
        assert_eq!(config.window, WindowSpec::After { duration: 300.0, offset: 20.0 });
    }

    #[test]
    fn test_fixed_window_needs_hour() {
        let args = PipelineArgs {
            window: Some(WindowArg::Fixed),
            ..Default::default()
        };
        assert!(args.resolve(None).is_err());

        let args = PipelineArgs {
            window: Some(WindowArg::Fixed),
            fixed_hour: Some(14),
            ..Default::default()
        };
        assert_eq!(
            args.resolve(None).unwrap().window,
            WindowSpec::FixedLocalTime { hour: 14, duration: 600.0 }
        );
    }

    #[test]
    fn test_invalid_window_size_rejected() {
        let args = PipelineArgs {
            smoothing_window: Some(8),
            ..Default::default()
        };
        assert!(args.resolve(None).is_err());
    }
}
