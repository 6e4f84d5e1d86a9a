use std::io::Read;
use std::path::Path;

use tracing::info;

use crate::cli::args::{ConfigAction, ConfigArgs, ExecArgs, InitArgs, OutputFormat};
use crate::config::loader::get_config_path;
use crate::config::PyletConfig;
use crate::error::{PyletError, Result};
use crate::exec::{render, ExecutionResult, ExitStatus};
use crate::service::{ExecutionRequest, ExecutionService};

/// Execute code in the workspace
pub async fn exec(args: ExecArgs, config: PyletConfig, format: OutputFormat) -> Result<()> {
    let code = read_code(&args)?;

    info!(
        name = ?args.name,
        timeout = ?args.timeout,
        bytes = code.len(),
        "Executing script"
    );

    let service = ExecutionService::new(&config)?;
    let request = ExecutionRequest {
        code,
        filename: args.name,
        timeout_seconds: args.timeout,
    };

    match format {
        OutputFormat::Text => {
            println!("{}", service.execute(request).await);
        }
        OutputFormat::Json => match service.run(&request).await {
            Ok((result, timeout_secs)) => {
                println!("{}", result_json(&result, timeout_secs));
            }
            Err(e) => {
                println!("{}", serde_json::json!({ "error": e.to_string() }));
            }
        },
    }

    Ok(())
}

/// Structured counterpart of the text report.
fn result_json(result: &ExecutionResult, timeout_secs: u64) -> serde_json::Value {
    let exit_code = match result.status {
        ExitStatus::Exited(code) => serde_json::json!(code),
        ExitStatus::TimedOut => serde_json::json!("timed_out"),
    };
    serde_json::json!({
        "stdout": result.stdout,
        "stderr": result.stderr,
        "exit_code": exit_code,
        "timed_out": result.timed_out(),
        "elapsed_seconds": result.elapsed.as_secs_f64(),
        "timeout_seconds": timeout_secs,
        "report": render(result, timeout_secs),
    })
}

/// Resolve the code to run from inline argument, file, or stdin.
fn read_code(args: &ExecArgs) -> Result<String> {
    match (&args.code, &args.file) {
        (Some(code), None) => Ok(code.clone()),
        (None, Some(path)) if path == Path::new("-") => read_stdin(),
        (None, Some(path)) => Ok(std::fs::read_to_string(path)?),
        (None, None) => read_stdin(),
        (Some(_), Some(_)) => Err(PyletError::Config(
            "pass either --code or --file, not both".to_string(),
        )),
    }
}

fn read_stdin() -> Result<String> {
    let mut code = String::new();
    std::io::stdin().read_to_string(&mut code)?;
    Ok(code)
}

pub async fn init(args: InitArgs) -> Result<()> {
    let config_path = get_config_path();

    if config_path.exists() && !args.force {
        println!("Configuration already exists at: {}", config_path.display());
        println!("Use --force to overwrite");
        return Ok(());
    }

    // Create parent directories if needed
    if let Some(parent) = config_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    // Write default configuration
    let default_config = PyletConfig::default();
    let toml_str =
        toml::to_string_pretty(&default_config).map_err(|e| PyletError::Config(e.to_string()))?;

    std::fs::write(&config_path, toml_str)?;

    println!("Created configuration at: {}", config_path.display());
    println!("\nQuick start:");
    println!("  # Run inline code in the current directory's workspace");
    println!("  pylet exec --code \"print('hello')\"");
    println!();
    println!("  # Run a file with a 10 second limit");
    println!("  pylet exec --file analysis.py --timeout 10");
    println!();
    println!("  # Pipe code from stdin into a named scratch file");
    println!("  cat job.py | pylet exec --name job");

    Ok(())
}

pub async fn config(args: ConfigArgs, config: PyletConfig) -> Result<()> {
    match args.action {
        ConfigAction::Show => {
            let toml_str =
                toml::to_string_pretty(&config).map_err(|e| PyletError::Config(e.to_string()))?;
            println!("{}", toml_str);
        }
        ConfigAction::Path => {
            println!("{}", get_config_path().display());
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn json_output_carries_structured_fields() {
        let result = ExecutionResult {
            stdout: "hi\n".to_string(),
            stderr: String::new(),
            status: ExitStatus::Exited(0),
            elapsed: Duration::from_millis(500),
        };

        let value = result_json(&result, 30);
        assert_eq!(value["stdout"], "hi\n");
        assert_eq!(value["stderr"], "");
        assert_eq!(value["exit_code"], 0);
        assert_eq!(value["timed_out"], false);
        assert_eq!(value["timeout_seconds"], 30);
        assert!(value["report"].as_str().unwrap().contains("exit code: 0"));
    }

    #[test]
    fn json_output_marks_a_timeout() {
        let result = ExecutionResult {
            stdout: "partial\n".to_string(),
            stderr: String::new(),
            status: ExitStatus::TimedOut,
            elapsed: Duration::from_secs(15),
        };

        let value = result_json(&result, 15);
        assert_eq!(value["exit_code"], "timed_out");
        assert_eq!(value["timed_out"], true);
        assert_eq!(value["stdout"], "partial\n");
    }
}
