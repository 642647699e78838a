use std::fs;
use std::path::Path;

use anyhow::Context;

use jcv_core::PipelineConfig;

/// Load a JSON pipeline config; omitted fields keep their defaults.
pub fn load_config(path: impl AsRef<Path>) -> anyhow::Result<PipelineConfig> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).with_context(|| format!("reading config {:?}", path))?;
    let config: PipelineConfig =
        serde_json::from_str(&text).with_context(|| format!("parsing config {:?}", path))?;
    config.validate()?;
    Ok(config)
}
