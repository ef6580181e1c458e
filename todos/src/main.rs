//! Line-oriented front end for the todo list.
//!
//! Reads one command per line from stdin, dispatches it into the store, waits
//! for the remote calls it started to settle, then prints the list.

use anyhow::{bail, Context};
use std::fmt::Write as _;
use todosync_runtime::{EffectHandle, Store};
use tokio::io::{AsyncBufReadExt, BufReader};
use todos::{
    bulk, ConfigError, Filter, TitleEdit, TodoAction, TodoEnvironment, TodoId, TodoReducer,
    TodoState, TodoStore, TodosConfig,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const HELP: &str = "\
commands:
  add <title>          create a todo
  toggle <id>          flip completion of a todo
  toggle-all           complete all active todos, or reopen all
  edit <id> <title>    rename a todo (an empty title deletes it)
  rm <id>              delete a todo
  clear-completed      delete every completed todo
  filter <name>        all | active | completed
  list                 show the list
  dismiss              hide the current error
  quit                 exit";

/// A parsed input line
#[derive(Debug, Clone, PartialEq, Eq)]
enum Command {
    Add(String),
    Toggle(TodoId),
    ToggleAll,
    Edit(TodoId, String),
    Remove(TodoId),
    ClearCompleted,
    Filter(Filter),
    List,
    Dismiss,
    Help,
    Quit,
}

fn parse_id(raw: &str) -> Result<TodoId, String> {
    raw.trim()
        .parse::<u64>()
        .map(TodoId::new)
        .map_err(|_| format!("not a todo id: {raw:?}"))
}

fn parse_command(line: &str) -> Result<Command, String> {
    let line = line.trim();
    let (word, rest) = line.split_once(' ').unwrap_or((line, ""));

    match word {
        "add" => Ok(Command::Add(rest.to_string())),
        "toggle" => parse_id(rest).map(Command::Toggle),
        "toggle-all" => Ok(Command::ToggleAll),
        "edit" => {
            let rest = rest.trim_start();
            let (id, title) = rest.split_once(' ').unwrap_or((rest, ""));
            Ok(Command::Edit(parse_id(id)?, title.to_string()))
        },
        "rm" => parse_id(rest).map(Command::Remove),
        "clear-completed" => Ok(Command::ClearCompleted),
        "filter" => rest
            .parse()
            .map(Command::Filter)
            .map_err(|e: todos::filter::ParseFilterError| e.to_string()),
        "list" | "" => Ok(Command::List),
        "dismiss" => Ok(Command::Dismiss),
        "help" | "?" => Ok(Command::Help),
        "quit" | "exit" => Ok(Command::Quit),
        other => Err(format!("unknown command: {other:?} (try `help`)")),
    }
}

/// Render the list the way the page would show it
fn render(state: &TodoState, filter: Filter) -> String {
    let mut out = String::new();

    for todo in state.visible(filter) {
        let mark = if todo.completed { 'x' } else { ' ' };
        let busy = if state.is_processing(todo.id) { "  (saving...)" } else { "" };
        let _ = writeln!(out, "[{mark}] {:>4}  {}{busy}", todo.id, todo.title);
    }
    if let Some(temp) = &state.temp_todo {
        let _ = writeln!(out, "[ ]    -  {}  (adding...)", temp.title);
    }
    if state.count() > 0 {
        let _ = writeln!(out, "{} items left  [{filter}]", state.items_left());
    }
    if let Some(message) = state.error_message() {
        let _ = writeln!(out, "! {message}");
    }
    out
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "todos=info,todosync_runtime=warn".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();
}

async fn settle(handles: Vec<EffectHandle>) {
    for mut handle in handles {
        handle.wait().await;
    }
}

/// Dispatch `actions` and wait for every remote call they started
async fn dispatch_all(store: &TodoStore, actions: Vec<TodoAction>) -> anyhow::Result<()> {
    let mut handles = Vec::with_capacity(actions.len());
    for action in actions {
        handles.push(store.send(action).await?);
    }
    settle(handles).await;
    Ok(())
}

async fn find(store: &TodoStore, id: TodoId) -> Option<todos::Todo> {
    store.state(|s| s.get(id).cloned()).await
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = TodosConfig::from_env().context("Invalid configuration")?;
    let env = match TodoEnvironment::from_config(&config) {
        Ok(env) => env,
        Err(ConfigError::MissingUserId) => {
            eprintln!("Please set TODOS_USER_ID to your user id before using the app.");
            bail!(ConfigError::MissingUserId);
        },
        Err(error) => return Err(error).context("Unable to set up the API client"),
    };

    tracing::info!(base_url = %config.base_url, user_id = %env.user_id, "Starting");
    let store: TodoStore = Store::new(TodoState::new(), TodoReducer::new(), env);

    dispatch_all(&store, vec![TodoAction::LoadTodos]).await?;
    let mut filter = Filter::default();
    print!("{}", store.state(|s| render(s, filter)).await);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let command = match parse_command(&line) {
            Ok(command) => command,
            Err(message) => {
                eprintln!("{message}");
                continue;
            },
        };

        match command {
            Command::Add(title) => {
                dispatch_all(&store, vec![TodoAction::create(title)]).await?;
            },
            Command::Toggle(id) => match find(&store, id).await {
                Some(todo) => dispatch_all(&store, vec![bulk::toggle(&todo)]).await?,
                None => eprintln!("no todo {id}"),
            },
            Command::ToggleAll => {
                let actions = store.state(|s| bulk::toggle_all(&s.todos)).await;
                dispatch_all(&store, actions).await?;
            },
            Command::Edit(id, title) => match find(&store, id).await {
                Some(todo) => {
                    let mut edit = TitleEdit::begin(&todo);
                    edit.set_buffer(title);
                    if let Some(action) = edit.finish().into_action() {
                        dispatch_all(&store, vec![action]).await?;
                    }
                },
                None => eprintln!("no todo {id}"),
            },
            Command::Remove(id) => {
                let action = TodoAction::delete(id).on_success(TodoAction::FocusNewTodoInput);
                dispatch_all(&store, vec![action]).await?;
            },
            Command::ClearCompleted => {
                let actions = store.state(|s| bulk::clear_completed(&s.todos)).await;
                dispatch_all(&store, actions).await?;
            },
            Command::Filter(selected) => filter = selected,
            Command::List => {},
            Command::Dismiss => dispatch_all(&store, vec![TodoAction::ClearError]).await?,
            Command::Help => {
                println!("{HELP}");
                continue;
            },
            Command::Quit => break,
        }

        print!("{}", store.state(|s| render(s, filter)).await);
    }

    // Pending error timers are short; let them run out
    let timeout = store.config().default_shutdown_timeout;
    store.shutdown(timeout).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use todos::{Todo, TodoError, UserId};

    fn todo(id: u64, title: &str, completed: bool) -> Todo {
        Todo::new(TodoId::new(id), UserId::new(1), title, completed)
    }

    #[test]
    fn parses_commands() {
        assert_eq!(parse_command("add  buy milk"), Ok(Command::Add(" buy milk".to_string())));
        assert_eq!(parse_command("toggle 3"), Ok(Command::Toggle(TodoId::new(3))));
        assert_eq!(
            parse_command("edit 3 oat milk"),
            Ok(Command::Edit(TodoId::new(3), "oat milk".to_string()))
        );
        assert_eq!(parse_command("edit 3"), Ok(Command::Edit(TodoId::new(3), String::new())));
        assert_eq!(parse_command("filter active"), Ok(Command::Filter(Filter::Active)));
        assert_eq!(parse_command(""), Ok(Command::List));
        assert_eq!(parse_command("quit"), Ok(Command::Quit));
    }

    #[test]
    fn rejects_bad_input() {
        assert!(parse_command("rm x").is_err());
        assert!(parse_command("filter done").is_err());
        assert!(parse_command("frobnicate").is_err());
    }

    #[test]
    fn renders_list_placeholder_and_error() {
        let mut state = TodoState::with_todos(vec![todo(1, "A", false), todo(2, "B", true)]);
        state.processing.insert(TodoId::new(2));
        state.temp_todo = Some(todo(0, "C", false));
        state.error = Some(todos::types::ErrorNotice {
            error: TodoError::AddTodo,
            seq: 1,
        });

        let out = render(&state, Filter::All);
        assert!(out.contains("[ ]    1  A\n"));
        assert!(out.contains("[x]    2  B  (saving...)"));
        assert!(out.contains("C  (adding...)"));
        assert!(out.contains("1 items left  [all]"));
        assert!(out.contains("! Unable to add a todo"));

        let active = render(&state, Filter::Completed);
        assert!(!active.contains("  A\n"));
    }
}
