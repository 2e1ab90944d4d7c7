// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! netcapture CLI
//!
//! Issues one call through an instrumented network and prints every captured
//! entry as a JSON line.

use std::env;
use std::process::ExitCode;

use anyhow::Context;
use netcapture::{
    json_lines_listener, AppContext, Body, CaptureConfig, HttpClient, Network, NetworkCapture,
    Request,
};
use reqwest::Method;

#[tokio::main]
async fn main() -> ExitCode {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("netcapture=info".parse().unwrap()),
        )
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        print_usage();
        return ExitCode::from(1);
    }

    let result = match args[1].as_str() {
        "fetch" | "xhr" => {
            if args.len() < 3 {
                eprintln!("Usage: netcapture {} <url> [--data <body>] [--production]", args[1]);
                return ExitCode::from(1);
            }
            let options = Options::parse(&args[3..]);
            run(args[1] == "xhr", &args[2], options).await
        }
        "--help" | "-h" | "help" => {
            print_usage();
            return ExitCode::SUCCESS;
        }
        "--version" | "-v" | "version" => {
            println!("netcapture {}", netcapture::VERSION);
            return ExitCode::SUCCESS;
        }
        cmd => {
            eprintln!("Unknown command: {}", cmd);
            print_usage();
            return ExitCode::from(1);
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::from(1)
        }
    }
}

fn print_usage() {
    println!(
        r#"netcapture - Network Traffic Capture

USAGE:
    netcapture <COMMAND> [OPTIONS]

COMMANDS:
    fetch <url>     Issue a promise-style call and print captured entries
    xhr <url>       Issue an event-driven call and print captured entries
    help            Show this help message
    version         Show version information

OPTIONS:
    --data <body>   Send <body> with a POST instead of a GET
    --production    Use the production capture preset (no bodies)

EXAMPLES:
    netcapture fetch https://api.example.com/users
    netcapture xhr "https://example.com/search?q=rust&token=secret"
    netcapture fetch https://example.com/login --data "user=me"
"#
    );
}

#[derive(Debug, Default)]
struct Options {
    data: Option<String>,
    production: bool,
}

impl Options {
    fn parse(args: &[String]) -> Self {
        let mut options = Self::default();
        let mut iter = args.iter();
        while let Some(arg) = iter.next() {
            match arg.as_str() {
                "--data" => options.data = iter.next().cloned(),
                "--production" => options.production = true,
                other => eprintln!("Ignoring unknown option: {}", other),
            }
        }
        options
    }

    fn method(&self) -> Method {
        if self.data.is_some() {
            Method::POST
        } else {
            Method::GET
        }
    }
}

async fn run(event_driven: bool, url: &str, options: Options) -> anyhow::Result<()> {
    let config = if options.production {
        CaptureConfig::for_production()
    } else {
        CaptureConfig::for_development()
    };
    let config = config.app(AppContext::new("netcapture-cli"));

    let network = Network::new(HttpClient::new().context("failed to build HTTP client")?);
    let capture = NetworkCapture::new(config).context("invalid capture configuration")?;
    capture.add_listener(json_lines_listener(std::io::stdout()));
    capture.start(&network);

    let body = options.data.clone().map(Body::text);
    let outcome = if event_driven {
        let mut xhr = network.xhr();
        xhr.open(options.method(), url)
            .with_context(|| format!("failed to open {}", url))?;
        xhr.send(body).await.context("failed to send")?;
        match xhr.state().error() {
            Some(error) => Err(anyhow::anyhow!("{}", error)),
            None => {
                tracing::info!(status = xhr.status(), "Event-driven call finished");
                Ok(())
            }
        }
    } else {
        let mut request = Request::new(options.method(), url)?;
        request.body = body;
        network
            .fetch(request)
            .await
            .map(|response| {
                tracing::info!(status = response.status_code(), "Promise call finished");
            })
            .map_err(anyhow::Error::from)
    };

    capture.stop(&network);

    let stats = capture.stats();
    tracing::info!(
        emitted = stats.emitted,
        listener_failures = stats.listener_failures,
        "Capture finished"
    );
    outcome
}
