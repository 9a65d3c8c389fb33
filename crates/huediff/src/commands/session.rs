use super::diff::{present, read_source};
use super::SessionCommand;
use crate::clipboard::SystemClipboard;
use crate::config::{Config, OutputFormat};
use anyhow::{bail, Context, Result};
use huediff_core::{ClipboardSource, FileStorage, Session, StateStore, Storage};

pub fn execute(config: &Config, command: &SessionCommand) -> Result<()> {
    let path = config.state_path();
    let storage = FileStorage::open(&path)
        .with_context(|| format!("Failed to open session state {}", path.display()))?;
    let mut session =
        Session::with_parts(StateStore::new(storage), config.engine(), config.renderer());

    let out = apply(config, &mut session, command, || {
        let clipboard = SystemClipboard::new();
        clipboard.is_available().then_some(clipboard)
    })?;
    if !matches!(command, SessionCommand::Show { .. }) {
        tracing::info!(path = %path.display(), mode = %session.mode(), "session updated");
    }
    println!("{out}");
    Ok(())
}

/// Run `command` against `session` and return what should be printed
fn apply<S, C>(
    config: &Config,
    session: &mut Session<S>,
    command: &SessionCommand,
    open_clipboard: impl FnOnce() -> Option<C>,
) -> Result<String>
where
    S: Storage,
    C: ClipboardSource,
{
    match command {
        SessionCommand::Show { format } => {
            return Ok(render(config, session, format.unwrap_or(config.format)));
        }
        SessionCommand::Set { slot, source } => {
            let text = read_source(source)?;
            session.set_input((*slot).into(), text)?;
        }
        SessionCommand::Paste { slot } => {
            let Some(mut clipboard) = open_clipboard() else {
                bail!("Reading the clipboard is not supported here");
            };
            if !session.paste((*slot).into(), &mut clipboard)? {
                eprintln!("Clipboard has no text; input left unchanged");
            }
        }
        SessionCommand::Clear { slot: Some(slot) } => session.clear_input((*slot).into())?,
        SessionCommand::Clear { slot: None } => session.reset()?,
        SessionCommand::Mode { mode } => session.set_mode(*mode)?,
    }
    Ok(render(config, session, config.format))
}

fn render<S: Storage>(config: &Config, session: &Session<S>, format: OutputFormat) -> String {
    match format {
        // The persisted output is already markup
        OutputFormat::Html if !session.output().is_empty() => session.output().to_string(),
        _ => {
            let state = session.state();
            present(
                config,
                &config.engine(),
                &state.input1,
                &state.input2,
                state.mode,
                format,
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::Slot;
    use huediff_core::store::{INPUT1_KEY, INPUT2_KEY, OUTPUT_KEY};
    use huediff_core::{MemoryStorage, Mode, Palette, PersistedState};
    use pretty_assertions::assert_eq;
    use std::path::Path;

    const PLACEHOLDER: &str = "<span class=\"placeholder\">Difference</span>";

    struct FakeClipboard(Option<String>);

    impl ClipboardSource for FakeClipboard {
        fn read_text(&mut self) -> Option<String> {
            self.0.take()
        }
    }

    fn reopen(path: &Path) -> PersistedState {
        let session = Session::open(StateStore::new(FileStorage::open(path).unwrap()));
        session.state().clone()
    }

    fn memory_session(config: &Config) -> Session<MemoryStorage> {
        Session::with_parts(
            StateStore::new(MemoryStorage::new()),
            config.engine(),
            config.renderer(),
        )
    }

    fn html_config() -> Config {
        Config {
            format: OutputFormat::Html,
            ..Config::default()
        }
    }

    #[test]
    fn test_set_mode_clear_persist_through_state_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        let config = Config {
            state_file: Some(path.clone()),
            ..html_config()
        };
        let old = dir.path().join("old.txt");
        let new = dir.path().join("new.txt");
        std::fs::write(&old, "abc").unwrap();
        std::fs::write(&new, "abd").unwrap();

        let set = |slot, source: &Path| SessionCommand::Set {
            slot,
            source: source.to_path_buf(),
        };
        execute(&config, &set(Slot::First, &old)).unwrap();
        execute(&config, &set(Slot::Second, &new)).unwrap();
        execute(&config, &SessionCommand::Mode { mode: Mode::Lines }).unwrap();
        execute(&config, &SessionCommand::Show { format: None }).unwrap();

        assert_eq!(
            reopen(&path),
            PersistedState {
                input1: "abc".to_string(),
                input2: "abd".to_string(),
                mode: Mode::Lines,
                output: "<span style=\"color:red\">abc</span>\
                         <span style=\"color:green\">abd</span>"
                    .to_string(),
            }
        );

        execute(&config, &SessionCommand::Clear { slot: Some(Slot::First) }).unwrap();
        let state = reopen(&path);
        assert_eq!(state.input1, "");
        assert_eq!(state.input2, "abd");
        assert_eq!(state.output, PLACEHOLDER);

        execute(&config, &SessionCommand::Clear { slot: None }).unwrap();
        assert_eq!(reopen(&path), PersistedState::default());
    }

    #[test]
    fn test_set_from_missing_file_leaves_state_alone() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        let config = Config {
            state_file: Some(path.clone()),
            ..Config::default()
        };
        let command = SessionCommand::Set {
            slot: Slot::First,
            source: dir.path().join("missing.txt"),
        };
        assert!(execute(&config, &command).is_err());
        assert_eq!(reopen(&path), PersistedState::default());
    }

    #[test]
    fn test_show_reuses_persisted_html() {
        let mut storage = MemoryStorage::new();
        storage.save(INPUT1_KEY, "\"a\"").unwrap();
        storage.save(INPUT2_KEY, "\"b\"").unwrap();
        storage.save(OUTPUT_KEY, "\"<b>kept</b>\"").unwrap();
        let config = html_config();
        let session = Session::with_parts(
            StateStore::new(storage),
            config.engine(),
            config.renderer(),
        );

        assert_eq!(render(&config, &session, OutputFormat::Html), "<b>kept</b>");
    }

    #[test]
    fn test_show_recomputes_without_persisted_html() {
        let mut storage = MemoryStorage::new();
        storage.save(INPUT1_KEY, "\"a\"").unwrap();
        storage.save(INPUT2_KEY, "\"ab\"").unwrap();
        let config = Config {
            colors: Palette {
                added: "lime".to_string(),
                ..Palette::default()
            },
            ..html_config()
        };
        let session = Session::with_parts(
            StateStore::new(storage),
            config.engine(),
            config.renderer(),
        );

        assert_eq!(
            render(&config, &session, OutputFormat::Html),
            "<span style=\"color:grey\">a</span><span style=\"color:lime\">b</span>"
        );
    }

    #[test]
    fn test_paste_without_clipboard_is_an_error() {
        let config = html_config();
        let mut session = memory_session(&config);
        let command = SessionCommand::Paste { slot: Slot::First };

        let err = apply(&config, &mut session, &command, || None::<FakeClipboard>).unwrap_err();
        assert!(err.to_string().contains("not supported"));
        assert_eq!(session.state(), &PersistedState::default());
    }

    #[test]
    fn test_paste_sets_input() {
        let config = html_config();
        let mut session = memory_session(&config);
        let command = SessionCommand::Paste { slot: Slot::Second };

        apply(&config, &mut session, &command, || {
            Some(FakeClipboard(Some("pasted".to_string())))
        })
        .unwrap();
        assert_eq!(session.state().input2, "pasted");

        apply(&config, &mut session, &command, || Some(FakeClipboard(None))).unwrap();
        assert_eq!(session.state().input2, "pasted");
    }
}
