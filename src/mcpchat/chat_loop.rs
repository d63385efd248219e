//! The interactive chat surface.
//!
//! Line-oriented prompt/response loop: read one query per line, run it through the
//! [`CompletionOrchestrator`], print the answer, fold the turn's messages into the
//! running conversation. Typing `quit` (case-insensitive) or closing stdin ends the
//! loop; any other failure while processing a single query is reported and survived,
//! with the conversation state rolled back to before that turn.

use std::io::{self, Write};

use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};

use crate::client_wrapper::Message;
use crate::orchestrator::CompletionOrchestrator;
use crate::session_registry::SessionRegistry;

/// Run the interactive loop on stdin until `quit` or end-of-input.
pub async fn run_chat_loop(
    orchestrator: &CompletionOrchestrator,
    registry: &SessionRegistry,
) -> io::Result<()> {
    println!("\nmcpchat started!");
    println!("Type your queries or 'quit' to exit.");

    let reader = BufReader::new(tokio::io::stdin());
    // When input comes from a pipe or file, echo each query so the transcript
    // interleaves questions and answers the way a terminal session would.
    let echo_input = !is_terminal_stdin();
    chat_loop_on(reader, echo_input, orchestrator, registry)
        .await
        .map(|_| ())
}

fn is_terminal_stdin() -> bool {
    use std::io::IsTerminal;
    io::stdin().is_terminal()
}

/// The loop body, generic over its line source. Returns the conversation as
/// accumulated across successful turns.
pub async fn chat_loop_on<R>(
    reader: R,
    echo_input: bool,
    orchestrator: &CompletionOrchestrator,
    registry: &SessionRegistry,
) -> io::Result<Vec<Message>>
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = reader.lines();
    let mut conversation: Vec<Message> = Vec::new();

    loop {
        print!("> ");
        io::stdout().flush()?;

        let line = match lines.next_line().await? {
            Some(line) => line,
            None => {
                println!("\nReceived EOF, exiting gracefully...");
                break;
            }
        };
        let query = line.trim();
        if echo_input {
            println!("{}", query);
        }
        if query.eq_ignore_ascii_case("quit") {
            break;
        }

        match orchestrator.process_query(query, &conversation, registry).await {
            Ok(response) => {
                println!("\n< {}", response.text);
                conversation.extend(response.messages);
            }
            Err(err) => {
                // The failed turn's partial messages are discarded; the next turn
                // starts from the conversation as it was before this query.
                println!("\nError: {}", err);
            }
        }
    }

    Ok(conversation)
}
