use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context};
use parley::{
    CodeCompletion, CreativeKind, GenerationConfig, Generator, History, Language, PromptBridge,
    SamplingParams, StoryTheme, Template,
};
use parley_server::{build_router, AppState};
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

use crate::backend::Backend;
use crate::cli::{BackendKind, Cli, Command};
use crate::format::{extract_code, model_line};

type Bridge = PromptBridge<Arc<dyn Generator>>;

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let backend = cli.backend.connect()?;

    match cli.command {
        Command::Chat { style, sampling } => {
            let bridge = bridge(&backend, sampling.params());
            chat(&bridge, &style.template()).await
        }
        Command::Ask { question } => {
            let question = question.join(" ");
            one_shot(
                &backend,
                SamplingParams::default(),
                &Template::question(),
                &question,
            )
            .await
        }
        Command::Poem { topic } => {
            let topic = topic.join(" ");
            println!("Your theme: {topic}\n---");
            one_shot(
                &backend,
                SamplingParams::default(),
                &Template::Creative(CreativeKind::Poem),
                &topic,
            )
            .await
        }
        Command::Story {
            theme,
            preset,
            sampling,
        } => {
            let custom = theme.join(" ");
            let Some(theme) = StoryTheme::resolve(Some(custom.as_str()), preset) else {
                bail!("pick a --preset or give a theme");
            };
            println!("Theme: {theme}\n---");
            one_shot(
                &backend,
                sampling.params(),
                &Template::Creative(CreativeKind::Story),
                &theme,
            )
            .await
        }
        Command::Recipe { dish } => {
            let dish = dish.join(" ");
            println!("So you want to prepare {dish} today. Let's see how you can make it.\n");
            one_shot(
                &backend,
                SamplingParams::default(),
                &Template::Creative(CreativeKind::Recipe),
                &dish,
            )
            .await
        }
        Command::Complete {
            language,
            file,
            instructions,
            output,
            sampling,
        } => {
            let code = read_source(file.as_deref())?;
            if code.trim().is_empty() {
                bail!("provide the incomplete code to complete");
            }
            let mut completion = CodeCompletion::new(language);
            if let Some(instructions) = instructions {
                completion = completion.with_instructions(instructions);
            }

            eprintln!("Completing {language} code with {}...", backend.model);
            let bridge = bridge(&backend, sampling.params());
            let exchange = bridge
                .respond(&History::new(), &code, &Template::Completion(completion))
                .await;
            let reply = exchange.reply.map_err(|err| match backend.kind {
                BackendKind::Ollama => anyhow::anyhow!(
                    "{err}\nMake sure Ollama is running and the model is installed: ollama pull {}",
                    backend.model
                ),
                BackendKind::Google => anyhow::Error::new(err),
            })?;

            let completed = extract_code(&reply);
            println!("{completed}");
            if let Some(output) = output {
                let path = output_path(&output, language);
                std::fs::write(&path, format!("{completed}\n"))
                    .with_context(|| format!("writing {}", path.display()))?;
                eprintln!("Saved to {}", path.display());
            }
            Ok(())
        }
        Command::Models => {
            let models = backend.catalog.list_models().await?;
            if models.is_empty() {
                println!("No models available.");
            }
            for model in &models {
                println!("{}", model_line(model));
            }
            Ok(())
        }
        Command::Serve { bind } => {
            let config = GenerationConfig::new(backend.model.clone());
            let state = AppState::new(backend.generator, backend.catalog, config);
            println!("Chat page at http://{bind} (Ctrl+C to stop)");
            parley_server::run(build_router(state), bind).await?;
            Ok(())
        }
    }
}

fn bridge(backend: &Backend, sampling: SamplingParams) -> Bridge {
    PromptBridge::new(
        backend.generator.clone(),
        GenerationConfig::new(backend.model.clone()).with_sampling(sampling),
    )
}

async fn one_shot(
    backend: &Backend,
    sampling: SamplingParams,
    template: &Template,
    message: &str,
) -> anyhow::Result<()> {
    let exchange = bridge(backend, sampling)
        .respond(&History::new(), message, template)
        .await;
    let reply = exchange.reply?;
    println!("{reply}");
    Ok(())
}

async fn chat(bridge: &Bridge, template: &Template) -> anyhow::Result<()> {
    let mut editor = DefaultEditor::new()?;
    let mut history = History::new();
    println!(
        "Chatting with {}. /clear resets, /history shows the transcript, /exit quits.",
        bridge.config().model
    );

    loop {
        let line = match editor.readline("you> ") {
            Ok(line) => line,
            Err(ReadlineError::Interrupted | ReadlineError::Eof) => break,
            Err(err) => return Err(err.into()),
        };
        let message = line.trim();
        if message.is_empty() {
            continue;
        }
        let _ = editor.add_history_entry(message);

        match message {
            "/exit" | "/quit" => break,
            "/clear" => {
                history = History::new();
                println!("(conversation cleared)");
            }
            "/history" => {
                for turn in &history {
                    println!("{}: {}", turn.role(), turn.content());
                }
            }
            _ => {
                let exchange = bridge.respond(&history, message, template).await;
                println!("assistant> {}", exchange.reply_text());
                history = exchange.history;
            }
        }
    }
    Ok(())
}

fn read_source(file: Option<&Path>) -> anyhow::Result<String> {
    match file {
        Some(path) => {
            std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))
        }
        None => {
            let mut code = String::new();
            io::stdin()
                .read_to_string(&mut code)
                .context("reading code from stdin")?;
            Ok(code)
        }
    }
}

fn output_path(output: &Path, language: Language) -> PathBuf {
    if output.is_dir() {
        output.join(format!("completed_code.{}", language.extension()))
    } else {
        output.to_path_buf()
    }
}
