//! Interactive chat loop.

use std::io::{self, Write};

use anyhow::Result;
use futures::StreamExt;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

use medrag_chat::{ChatOrchestrator, Session};

/// Run the read-ask-print loop until the user exits.
///
/// Answers are streamed fragment by fragment; a mid-stream failure is
/// shown in place of the rest of the answer and the session stays
/// usable. `/clear` wipes the conversation, `exit`/`quit` (or Ctrl-D)
/// leaves.
pub async fn run(orchestrator: &ChatOrchestrator) -> Result<()> {
    println!("MedRAG assistant. Ask about your ingested documents.");
    println!("Commands: /clear resets the conversation, exit quits.\n");

    let session = Session::new();
    let mut editor = DefaultEditor::new()?;

    loop {
        let line = match editor.readline("you> ") {
            Ok(line) => line,
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
            Err(e) => return Err(e.into()),
        };

        let input = line.trim();
        if input.is_empty() {
            continue;
        }
        editor.add_history_entry(input)?;

        match input {
            "exit" | "quit" => break,
            "/clear" => {
                session.clear().await;
                println!("Conversation cleared.\n");
                continue;
            }
            _ => {}
        }

        match orchestrator.ask_stream(&session, input).await {
            Ok(reply) => {
                print!("assistant> ");
                io::stdout().flush()?;

                let mut stream = reply.stream;
                let mut failed = false;
                while let Some(fragment) = stream.next().await {
                    match fragment {
                        Ok(text) => {
                            print!("{text}");
                            io::stdout().flush()?;
                        }
                        Err(e) => {
                            println!("\n[answer failed: {e}]");
                            failed = true;
                            break;
                        }
                    }
                }
                println!();

                if !failed && !reply.citations.is_empty() {
                    let sources: Vec<String> =
                        reply.citations.iter().map(ToString::to_string).collect();
                    println!("Sources: {}", sources.join("; "));
                }
            }
            Err(e) => println!("[answer failed: {e}]"),
        }
        println!();
    }

    println!("Goodbye.");
    Ok(())
}
