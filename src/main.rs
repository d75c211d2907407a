use std::env;
use std::path::PathBuf;

use tiny_rasterizer::app::{self, Params};
use tiny_rasterizer::logging::{init_logging, LoggingConfig};
use tiny_rasterizer::{AppError, CullMode};

const USAGE: &str = "usage: tiny_rasterizer [-p model.obj] [-o result.png] [-d depth.png] [-w width] [-h height] [-c none|back|front] [-q]";

/// Value following the flag at position i.
fn flag_value(args: &[String], i: usize) -> Result<&str, AppError> {
    return args
        .get(i + 1)
        .map(|value| value.as_str())
        .ok_or_else(|| AppError::Args(format!("missing value for {}\n{}", args[i], USAGE)));
}

fn parse_size(args: &[String], i: usize) -> Result<u32, AppError> {
    let value = flag_value(args, i)?;
    return match value.parse::<u32>() {
        Ok(size) if size > 0 => Ok(size),
        _ => Err(AppError::Args(format!("{} expects a positive integer, got {}", args[i], value))),
    };
}

fn parse_args(args: &[String]) -> Result<Params, AppError> {
    // Default values.
    let mut params = Params::default();

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "-p" => { params.model_path = Some(PathBuf::from(flag_value(args, i)?)); i += 1; }
            "-o" => { params.output_path = PathBuf::from(flag_value(args, i)?); i += 1; }
            "-d" => { params.depth_output_path = Some(PathBuf::from(flag_value(args, i)?)); i += 1; }
            "-w" => { params.width = parse_size(args, i)?; i += 1; }
            "-h" => { params.height = parse_size(args, i)?; i += 1; }
            "-c" => {
                params.cull_mode = match flag_value(args, i)? {
                    "none" => CullMode::None,
                    "back" => CullMode::Back,
                    "front" => CullMode::Front,
                    other => return Err(AppError::Args(format!("unknown cull mode {}", other))),
                };
                i += 1;
            }
            "-q" => { params.print_frame_time = true; }
            other => return Err(AppError::Args(format!("unknown argument {}\n{}", other, USAGE))),
        }
        i += 1;
    }

    return Ok(params);
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging(LoggingConfig::default());

    let args: Vec<String> = env::args().collect();
    let params = parse_args(&args)?;
    app::run(&params)?;

    return Ok(());
}
