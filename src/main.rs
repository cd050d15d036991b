use clap::Parser;
use mython::cli::{generate_completions, Args, Commands};
use mython::config::AppConfig;
use mython::diagnostic::render_diagnostic;
use mython::{Lexer, MythonError, RuntimeError, Token};
use owo_colors::OwoColorize;
use std::io::{self, Read, Write};
use std::path::Path;

fn main() {
    let args = Args::parse();

    if let Some(Commands::Complete { shell }) = args.command {
        generate_completions(shell);
        return;
    }

    let config = AppConfig::from_args(&args);

    verbose_log(&config, "Starting mython");

    let (source, source_name) = match read_source(&args, &config) {
        Ok(pair) => pair,
        Err(message) => {
            error_message(&config, &message);
            std::process::exit(1);
        }
    };

    verbose_log(
        &config,
        &format!("Read {} bytes of program text", source.len()),
    );

    if config.tokens {
        if let Err(err) = dump_tokens(&source) {
            report(&source, &source_name, &config, &err);
        }
        return;
    }

    let stdout = io::stdout();
    if let Err(err) = mython::run_program(&source, stdout.lock()) {
        report(&source, &source_name, &config, &err);
    }

    verbose_log(&config, "Program finished");
}

fn read_source(args: &Args, config: &AppConfig) -> Result<(String, String), String> {
    if let Some(source) = &args.eval {
        verbose_log(config, "Using program from command-line argument");
        Ok((source.clone(), "<eval>".to_string()))
    } else if let Some(file) = &args.file {
        verbose_log(
            config,
            &format!("Reading program from file: {}", file.display()),
        );
        Ok((read_file(file)?, file.display().to_string()))
    } else {
        verbose_log(config, "Reading program from stdin");
        let mut buffer = String::new();
        io::stdin()
            .read_to_string(&mut buffer)
            .map_err(|e| format!("Failed to read from stdin: {}", e))?;
        Ok((buffer, "<stdin>".to_string()))
    }
}

fn read_file(path: &Path) -> Result<String, String> {
    std::fs::read_to_string(path).map_err(|e| format!("Failed to read {}: {}", path.display(), e))
}

/// Prints the token stream one token per line, `Eof` excluded.
fn dump_tokens(source: &str) -> Result<(), MythonError> {
    let mut lexer = Lexer::new(source)?;
    let stdout = io::stdout();
    let mut out = stdout.lock();
    while !matches!(lexer.current(), Token::Eof) {
        writeln!(out, "{}", lexer.current()).map_err(RuntimeError::io)?;
        lexer.advance();
    }
    Ok(())
}

fn report(source: &str, source_name: &str, config: &AppConfig, err: &MythonError) -> ! {
    let rendered = render_diagnostic(source, source_name, &err.to_diagnostic(), config.color_enabled);
    eprint!("{}", rendered);
    std::process::exit(1);
}

fn verbose_log(config: &AppConfig, message: &str) {
    if config.verbose {
        eprintln!("[mython:debug] {}", message);
    }
}

fn error_message(config: &AppConfig, message: &str) {
    if config.color_enabled {
        eprintln!("{}", message.red().bold());
    } else {
        eprintln!("{}", message);
    }
}
