// src/cli/chat.rs — Interactive REPL

use crate::content::WeekId;
use crate::provider::Role;
use crate::session::{ConversationState, SessionController, WeekIntro};

/// Run the interactive chat REPL starting in `start_week`.
pub async fn run_chat(controller: &SessionController, start_week: WeekId) -> anyhow::Result<()> {
    let mut state = ConversationState::new();

    eprintln!(
        "weekcoach v{} | {} week(s) | /help for commands\n",
        env!("CARGO_PKG_VERSION"),
        controller.content().len(),
    );

    switch_week(controller, &mut state, start_week).await?;

    while let Some(input) = read_input() {
        let trimmed = input.trim();

        if is_quit(trimmed) {
            break;
        }

        if trimmed.starts_with('/') {
            handle_slash_command(trimmed, controller, &mut state).await;
            continue;
        }

        if trimmed.is_empty() {
            continue;
        }

        match controller.submit_chat_message(&mut state, trimmed).await {
            Ok(()) => {
                if let Some(reply) = state.transcript().last().filter(|m| m.role == Role::Assistant)
                {
                    println!("\n{}\n", reply.content);
                }
            }
            Err(e) if e.is_backend() => {
                eprintln!("[notice] The coach could not answer just now: {e}");
                eprintln!("[notice] Your message was kept. Send another to try again.");
            }
            Err(e) => eprintln!("[error] {e}"),
        }
    }

    eprintln!(
        "\nSession {} ended with {} message(s).",
        state.session_id(),
        state.transcript().len()
    );
    Ok(())
}

/// Only the slash command ends the session; plain words go to the coach.
fn is_quit(input: &str) -> bool {
    input == "/quit"
}

fn read_input() -> Option<String> {
    use std::io::{self, BufRead, Write};

    print!("> ");
    io::stdout().flush().ok();

    let stdin = io::stdin();
    let mut line = String::new();
    match stdin.lock().read_line(&mut line) {
        Ok(0) => None, // EOF
        Ok(_) => Some(line),
        Err(_) => None,
    }
}

/// Select a week and print its page: title, intro, practice, greeting.
async fn switch_week(
    controller: &SessionController,
    state: &mut ConversationState,
    week: WeekId,
) -> anyhow::Result<()> {
    controller.select_week(state, week).await?;
    let Some(w) = controller.current_week(state) else {
        return Ok(());
    };

    println!("## {}\n", w.label());
    if !w.intro.trim().is_empty() {
        println!("{}\n", w.intro.trim());
    }

    let intro = controller.get_or_generate_week_intro(state).await;
    print_intro(&intro);

    println!("### Practice of the week\n");
    println!("{}\n", w.display_practice().trim());
    println!("{}\n", controller.greeting());
    Ok(())
}

fn print_intro(intro: &WeekIntro) {
    if intro.is_empty() {
        eprintln!("[notice] The week introduction is not available right now. Try /intro later.\n");
        return;
    }
    println!("{}\n", intro.intro_to_the_week);
    println!("**How will this help me?**\n");
    println!("{}\n", intro.why_this_matters);
    println!("{}\n", intro.encouragement_to_chat);
}

async fn handle_slash_command(
    input: &str,
    controller: &SessionController,
    state: &mut ConversationState,
) {
    let parts: Vec<&str> = input.splitn(2, ' ').collect();
    let cmd = parts[0];
    let arg = parts.get(1).map(|s| s.trim()).unwrap_or("");

    match cmd {
        "/week" => {
            if arg.is_empty() {
                match controller.current_week(state) {
                    Some(w) => eprintln!("  Current: {}", w.label()),
                    None => eprintln!("  No week selected."),
                }
                return;
            }
            match arg.parse::<WeekId>() {
                Ok(id) => {
                    if let Err(e) = switch_week(controller, state, id).await {
                        eprintln!("[error] {e}");
                    }
                }
                Err(e) => eprintln!("  {e}"),
            }
        }

        "/weeks" => {
            let current = state.selected_week();
            for w in controller.content().weeks() {
                let marker = if Some(w.id) == current { " *" } else { "" };
                eprintln!("  {}{}", w.label(), marker);
            }
        }

        "/intro" => {
            let intro = controller.get_or_generate_week_intro(state).await;
            print_intro(&intro);
        }

        "/practice" => match controller.current_week(state) {
            Some(w) => println!("{}\n", w.display_practice().trim()),
            None => eprintln!("  No week selected."),
        },

        "/history" => {
            let visible = controller.visible_transcript(state);
            if visible.is_empty() {
                eprintln!("  (no messages yet)");
            }
            for m in visible {
                let who = match m.role {
                    Role::User => "you",
                    Role::Assistant => "coach",
                    Role::System => continue,
                };
                println!("{who}: {}\n", m.content);
            }
        }

        "/session" => {
            eprintln!("  Session: {}", state.session_id());
            eprintln!("  Phase: {:?}", state.phase());
            eprintln!("  Messages: {}", state.transcript().len());
        }

        "/help" => {
            eprintln!("  /week <n>   Switch to week n (starts a new session)");
            eprintln!("  /weeks      List all weeks");
            eprintln!("  /intro      Show this week's introduction");
            eprintln!("  /practice   Show this week's practice");
            eprintln!("  /history    Show recent messages");
            eprintln!("  /session    Show session id and state");
            eprintln!("  /quit       Exit");
        }

        _ => {
            eprintln!("  Unknown command: {cmd}. Type /help for a list.");
        }
    }
}
