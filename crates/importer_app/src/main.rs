mod cli;
mod config;
mod effects;
mod render;
mod report;

use std::process::ExitCode;
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::Context;
use clap::Parser;
use importer_core::{update, AppState, Effect, Msg, PollEnd, SessionState};
use importer_logging::{importer_error, importer_info, importer_warn};
use log::LevelFilter;

use cli::Cli;
use config::AppConfig;
use effects::EffectRunner;

const TICK_INTERVAL: Duration = Duration::from_millis(100);

fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::from(2)
        }
    }
}

fn run() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    importer_logging::initialize(cli.log.into(), LevelFilter::Info, None);

    let mut config = AppConfig::load(cli.config.as_deref())?;
    cli.apply(&mut config);
    config.validate()?;
    cli.check(&config)?;
    if matches!(cli.command, cli::Command::Upload { .. }) && config.needs_job_id() {
        importer_info!(
            "Status endpoint {} is per job; an upload answered with a redirect cannot be followed",
            config.endpoint_template
        );
    }

    let (msg_tx, msg_rx) = mpsc::channel::<Msg>();
    let runner =
        EffectRunner::new(config.engine_config(), msg_tx.clone()).context("starting engine")?;

    // Ticks only matter when a deadline has to be checked.
    let deadline = cli
        .deadline_secs
        .map(|secs| Instant::now() + Duration::from_secs(secs));
    if deadline.is_some() {
        let tick_tx = msg_tx.clone();
        thread::spawn(move || {
            while tick_tx.send(Msg::Tick).is_ok() {
                thread::sleep(TICK_INTERVAL);
            }
        });
    }

    msg_tx
        .send(cli.initial_msg())
        .context("queueing first message")?;
    drop(msg_tx);

    let mut state = AppState::new();
    let mut cancel_sent = false;
    while let Ok(msg) = msg_rx.recv() {
        let mut inbox = vec![msg];
        let past_deadline = deadline.is_some_and(|at| Instant::now() >= at);
        if past_deadline && !cancel_sent && state.session() == SessionState::Polling {
            importer_warn!("Deadline reached; cancelling");
            inbox.push(Msg::CancelRequested);
            cancel_sent = true;
        }

        for msg in inbox {
            let (next, effects) = update(state, msg);
            state = next;
            if state.consume_dirty() {
                for line in render::render(&state.view()) {
                    println!("{line}");
                }
            }
            for effect in runner.enqueue(effects) {
                if let Effect::WriteReport = effect {
                    write_report(&config, &state);
                }
            }
        }

        if is_done(&state) {
            break;
        }
    }

    Ok(exit_code(&state))
}

fn write_report(config: &AppConfig, state: &AppState) {
    let Some(path) = config.report_path.clone() else {
        return;
    };
    match report::save_report(path, state.page(), &config.render_options()) {
        Ok(written) => println!("Report: {}", written.display()),
        Err(err) => importer_error!("Failed to write report: {}", err),
    }
}

fn is_done(state: &AppState) -> bool {
    match state.session() {
        SessionState::Finished | SessionState::AwaitingCategorize => true,
        // Back to idle only after the upload was refused or failed.
        SessionState::Idle => {
            let view = state.view();
            view.form_errors.is_some() || view.upload_error.is_some()
        }
        SessionState::Uploading | SessionState::Polling => false,
    }
}

fn exit_code(state: &AppState) -> ExitCode {
    let view = state.view();
    let succeeded = match view.session {
        SessionState::AwaitingCategorize => true,
        SessionState::Finished => {
            view.poll_end == Some(PollEnd::Completed) && !view.page.state_label.is_failure()
        }
        _ => false,
    };
    if succeeded {
        importer_info!("Done");
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
