use std::io;
use std::process::ExitCode;

use clap::Parser;

use strand::cli::Args;
use strand::error::PipelineError;
use strand::pipeline::Pipeline;

fn init_logging() {
    tracing_subscriber::fmt()
        .without_time()
        .with_target(false)
        .with_level(false)
        .with_writer(io::stderr)
        .init();
}

fn main() -> ExitCode {
    init_logging();

    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(err) => {
            // clap's rendered message already includes usage text.
            eprint!("{err}");
            return ExitCode::from(1);
        }
    };

    let pipeline = match Pipeline::build(args.queue_capacity, &args.stage_names) {
        Ok(pipeline) => pipeline,
        Err(err @ PipelineError::UnknownStage(_)) | Err(err @ PipelineError::EmptyChain) => {
            eprintln!("usage: analyzer <queue_capacity> <stage_name>... - {err}");
            return ExitCode::from(1);
        }
        Err(err) => {
            eprintln!("[ERROR][analyzer] - failed to start pipeline: {err}");
            return ExitCode::from(2);
        }
    };

    let stdin = io::stdin();
    if let Err(err) = pipeline.run(stdin.lock()) {
        eprintln!("[ERROR][analyzer] - {err}");
        return ExitCode::from(2);
    }

    println!("Pipeline shutdown complete");
    ExitCode::SUCCESS
}
