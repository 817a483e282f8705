mod mesh;
mod scenes;

use std::str::FromStr;

use anyhow::{bail, Result};
use orrery_engine::device::GpuInit;
use orrery_engine::logging::{init_logging, LoggingConfig};
use orrery_engine::window::{Runtime, RuntimeConfig};

use scenes::{
    CubeConfig, CubeScene, DepthConfig, DepthScene, FieldConfig, FieldScene, LitConfig, LitScene, SolarConfig,
    SolarScene,
};

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
enum Demo {
    Solar,
    Cube,
    Depth,
    Field,
    Lit,
}

impl Demo {
    const NAMES: &'static str = "solar, cube, depth, field, lit";

    fn title(self) -> &'static str {
        match self {
            Demo::Solar => "orrery: solar",
            Demo::Cube => "orrery: cube (C cycles cull mode)",
            Demo::Depth => "orrery: depth (arrows/QE move red disc)",
            Demo::Field => "orrery: field (WASD/QE move)",
            Demo::Lit => "orrery: lit (arrows move light, WASD camera)",
        }
    }
}

impl FromStr for Demo {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "solar" => Ok(Demo::Solar),
            "cube" => Ok(Demo::Cube),
            "depth" => Ok(Demo::Depth),
            "field" => Ok(Demo::Field),
            "lit" => Ok(Demo::Lit),
            other => bail!("unknown demo `{other}` (expected one of: {})", Demo::NAMES),
        }
    }
}

fn main() -> Result<()> {
    init_logging(LoggingConfig::default());

    let demo = match std::env::args().nth(1) {
        Some(name) => name.parse()?,
        None => Demo::Solar,
    };
    log::info!("starting demo {demo:?}");

    let config = RuntimeConfig {
        title: demo.title().to_string(),
        ..RuntimeConfig::default()
    };
    let gpu = GpuInit::default();

    match demo {
        Demo::Solar => Runtime::run(config, gpu, SolarScene, SolarConfig::default()),
        Demo::Cube => Runtime::run(config, gpu, CubeScene, CubeConfig::default()),
        Demo::Depth => Runtime::run(config, gpu, DepthScene::default(), DepthConfig::default()),
        Demo::Field => Runtime::run(config, gpu, FieldScene, FieldConfig::default()),
        Demo::Lit => Runtime::run(config, gpu, LitScene, LitConfig::default()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_demo_names() {
        assert_eq!("solar".parse::<Demo>().unwrap(), Demo::Solar);
        assert_eq!("Cube".parse::<Demo>().unwrap(), Demo::Cube);
        assert_eq!("depth".parse::<Demo>().unwrap(), Demo::Depth);
        assert_eq!("field".parse::<Demo>().unwrap(), Demo::Field);
        assert_eq!("lit".parse::<Demo>().unwrap(), Demo::Lit);
    }

    #[test]
    fn rejects_unknown_demo() {
        let err = "teapot".parse::<Demo>().unwrap_err();
        assert!(err.to_string().contains("teapot"));
    }
}
