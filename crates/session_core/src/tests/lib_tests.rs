use super::*;

use std::{
    cell::RefCell,
    fs,
    path::{Path, PathBuf},
    time::{SystemTime, UNIX_EPOCH},
};

use recognition::RecognitionEngine;
use shared::{
    domain::{ClipboardImage, Recognition},
    error::{ClipboardError, EngineError, SessionError},
};

use crate::temp_image::encode_rgba_png;

struct TestEngine {
    reply: Option<String>,
    seen: RefCell<Vec<Vec<u8>>>,
}

impl TestEngine {
    fn ok(latex: &str) -> Self {
        Self {
            reply: Some(latex.to_string()),
            seen: RefCell::new(Vec::new()),
        }
    }

    fn failing() -> Self {
        Self {
            reply: None,
            seen: RefCell::new(Vec::new()),
        }
    }

    fn calls(&self) -> usize {
        self.seen.borrow().len()
    }
}

impl RecognitionEngine for TestEngine {
    fn name(&self) -> &str {
        "test"
    }

    fn recognize(&self, image: &[u8]) -> Result<Recognition, EngineError> {
        self.seen.borrow_mut().push(image.to_vec());
        match &self.reply {
            Some(latex) => Ok(Recognition::new(latex.clone())),
            None => Err(EngineError::Failed {
                status: "exit status: 1".to_string(),
                stderr: "model not loaded".to_string(),
            }),
        }
    }
}

#[derive(Default)]
struct TestClipboard {
    image: Option<ClipboardImage>,
    text: Option<String>,
    writes: usize,
    fail_reads: bool,
    fail_writes: bool,
}

impl ClipboardAccess for TestClipboard {
    fn read_image(&mut self) -> Result<Option<ClipboardImage>, ClipboardError> {
        if self.fail_reads {
            return Err(ClipboardError::Read("clipboard locked".to_string()));
        }
        Ok(self.image.clone())
    }

    fn write_text(&mut self, text: &str) -> Result<(), ClipboardError> {
        if self.fail_writes {
            return Err(ClipboardError::Write("clipboard locked".to_string()));
        }
        self.writes += 1;
        self.text = Some(text.to_string());
        Ok(())
    }
}

fn unique_dir(label: &str) -> PathBuf {
    let suffix = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock")
        .as_nanos();
    let dir = std::env::temp_dir().join(format!("latex_snap_session_{label}_{suffix}"));
    fs::create_dir_all(&dir).expect("test dir");
    dir
}

fn settings_in(dir: &Path) -> Settings {
    Settings {
        temp_dir: Some(dir.join("staging")),
        ..Settings::default()
    }
}

fn sample_image(width: usize, height: usize) -> ClipboardImage {
    let rgba = (0..width * height)
        .flat_map(|i| [(i % 256) as u8, 40, 200, 255])
        .collect();
    ClipboardImage {
        width,
        height,
        rgba,
    }
}

fn write_png(dir: &Path, name: &str, image: &ClipboardImage) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, encode_rgba_png(image).expect("encode")).expect("write png");
    path
}

fn staged_files(dir: &Path) -> Vec<PathBuf> {
    match fs::read_dir(dir.join("staging")) {
        Ok(entries) => entries
            .map(|entry| entry.expect("dir entry").path())
            .collect(),
        Err(_) => Vec::new(),
    }
}

#[test]
fn load_from_path_shows_exactly_the_engine_text_and_the_image() {
    let dir = unique_dir("load");
    let image = sample_image(6, 3);
    let path = write_png(&dir, "equation.png", &image);
    let controller =
        SessionController::new(TestEngine::ok("x^2+y^2=z^2"), TestClipboard::default(), settings_in(&dir));

    let next = controller
        .load_from_path(&SessionState::new(), &path)
        .expect("load");

    assert_eq!(next.recognized, "x^2+y^2=z^2");
    assert_eq!(next.editor_text, "x^2+y^2=z^2");
    assert_eq!(next.status, INITIAL_STATUS);
    let preview = next.preview.expect("preview");
    assert_eq!(preview.origin, ImageOrigin::File(path.clone()));
    assert_eq!(preview.size(), [6, 3]);
    assert_eq!(preview.rgba, image.rgba);
    assert_eq!(
        controller.engine().seen.borrow()[0],
        fs::read(&path).expect("read")
    );

    fs::remove_dir_all(dir).expect("cleanup");
}

#[test]
fn load_from_path_replaces_an_edited_session() {
    let dir = unique_dir("reload");
    let path = write_png(&dir, "equation.png", &sample_image(2, 2));
    let controller =
        SessionController::new(TestEngine::ok("\\int_0^1 x\\,dx"), TestClipboard::default(), settings_in(&dir));
    let before = SessionState {
        recognized: "old".to_string(),
        editor_text: "old, edited".to_string(),
        preview: None,
        status: COPIED_STATUS.to_string(),
    };

    let next = controller.load_from_path(&before, &path).expect("load");
    assert_eq!(next.recognized, "\\int_0^1 x\\,dx");
    assert_eq!(next.editor_text, "\\int_0^1 x\\,dx");
    assert!(next.preview.is_some());
    assert_eq!(next.status, COPIED_STATUS);

    fs::remove_dir_all(dir).expect("cleanup");
}

#[test]
fn unreadable_file_is_an_image_read_error() {
    let dir = unique_dir("missing");
    let controller =
        SessionController::new(TestEngine::ok("x"), TestClipboard::default(), settings_in(&dir));
    let missing = dir.join("nope.png");

    match controller.load_from_path(&SessionState::new(), &missing) {
        Err(SessionError::ImageRead { path, .. }) => assert_eq!(path, missing),
        other => panic!("expected image read error, got {other:?}"),
    }
    assert_eq!(controller.engine().calls(), 0);

    fs::remove_dir_all(dir).expect("cleanup");
}

#[test]
fn engine_failure_propagates() {
    let dir = unique_dir("engine_fail");
    let path = write_png(&dir, "equation.png", &sample_image(2, 2));
    let controller =
        SessionController::new(TestEngine::failing(), TestClipboard::default(), settings_in(&dir));

    let err = controller
        .load_from_path(&SessionState::new(), &path)
        .expect_err("engine failure");
    assert!(matches!(err, SessionError::Engine(EngineError::Failed { .. })), "{err}");

    fs::remove_dir_all(dir).expect("cleanup");
}

#[test]
fn recognized_but_undecodable_file_has_no_preview() {
    let dir = unique_dir("undecodable");
    let path = dir.join("equation.png");
    fs::write(&path, b"not really a png").expect("write");
    let controller =
        SessionController::new(TestEngine::ok("a+b"), TestClipboard::default(), settings_in(&dir));

    let next = controller
        .load_from_path(&SessionState::new(), &path)
        .expect("load");
    assert_eq!(next.editor_text, "a+b");
    assert!(next.preview.is_none());

    fs::remove_dir_all(dir).expect("cleanup");
}

#[test]
fn paste_without_clipboard_image_is_a_silent_no_op() {
    let dir = unique_dir("paste_empty");
    let mut controller =
        SessionController::new(TestEngine::ok("x"), TestClipboard::default(), settings_in(&dir));
    let state = SessionState::new().edited("keep me");

    let outcome = controller.load_from_clipboard(&state).expect("paste");
    assert!(outcome.is_none());
    assert_eq!(state.status, INITIAL_STATUS);
    assert_eq!(controller.engine().calls(), 0);
    assert!(staged_files(&dir).is_empty());

    fs::remove_dir_all(dir).expect("cleanup");
}

#[test]
fn paste_hands_the_engine_the_png_encoding_and_removes_the_temp_file() {
    let dir = unique_dir("paste");
    let image = sample_image(5, 4);
    let clipboard = TestClipboard {
        image: Some(image.clone()),
        ..TestClipboard::default()
    };
    let mut controller =
        SessionController::new(TestEngine::ok("\\sqrt{2}"), clipboard, settings_in(&dir));

    let next = controller
        .load_from_clipboard(&SessionState::new())
        .expect("paste")
        .expect("image on clipboard");

    assert_eq!(next.editor_text, "\\sqrt{2}");
    assert_eq!(next.recognized, "\\sqrt{2}");
    let preview = next.preview.expect("preview");
    assert_eq!(preview.origin, ImageOrigin::Clipboard);
    assert_eq!(preview.rgba, image.rgba);

    let seen = controller.engine().seen.borrow();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0], encode_rgba_png(&image).expect("encode"));
    let decoded = image::load_from_memory(&seen[0]).expect("decode").to_rgba8();
    assert_eq!(decoded.into_raw(), image.rgba);
    drop(seen);

    assert!(staged_files(&dir).is_empty(), "temp image should be deleted");
    fs::remove_dir_all(dir).expect("cleanup");
}

#[test]
fn paste_behaves_like_loading_the_same_png_from_disk() {
    let dir = unique_dir("paste_same");
    let image = sample_image(3, 3);
    let path = write_png(&dir, "same.png", &image);
    let clipboard = TestClipboard {
        image: Some(image),
        ..TestClipboard::default()
    };
    let mut controller = SessionController::new(TestEngine::ok("e^x"), clipboard, settings_in(&dir));

    let from_disk = controller
        .load_from_path(&SessionState::new(), &path)
        .expect("load");
    let from_clipboard = controller
        .load_from_clipboard(&SessionState::new())
        .expect("paste")
        .expect("image on clipboard");

    assert_eq!(from_disk.editor_text, from_clipboard.editor_text);
    assert_eq!(from_disk.recognized, from_clipboard.recognized);
    assert_eq!(from_disk.status, from_clipboard.status);
    let seen = controller.engine().seen.borrow();
    assert_eq!(seen[0], seen[1]);
    drop(seen);

    fs::remove_dir_all(dir).expect("cleanup");
}

#[test]
fn failed_recognition_still_removes_the_temp_file() {
    let dir = unique_dir("paste_fail");
    let clipboard = TestClipboard {
        image: Some(sample_image(2, 2)),
        ..TestClipboard::default()
    };
    let mut controller = SessionController::new(TestEngine::failing(), clipboard, settings_in(&dir));

    let err = controller
        .load_from_clipboard(&SessionState::new())
        .expect_err("engine failure");
    assert!(matches!(err, SessionError::Engine(_)));
    assert!(staged_files(&dir).is_empty());

    fs::remove_dir_all(dir).expect("cleanup");
}

#[test]
fn keep_temp_images_leaves_the_staged_png_behind() {
    let dir = unique_dir("paste_keep");
    let image = sample_image(2, 2);
    let clipboard = TestClipboard {
        image: Some(image.clone()),
        ..TestClipboard::default()
    };
    let settings = Settings {
        keep_temp_images: true,
        ..settings_in(&dir)
    };
    let mut controller = SessionController::new(TestEngine::ok("1"), clipboard, settings);

    controller
        .load_from_clipboard(&SessionState::new())
        .expect("paste")
        .expect("image on clipboard");

    let kept = staged_files(&dir);
    assert_eq!(kept.len(), 1);
    assert_eq!(
        fs::read(&kept[0]).expect("read kept"),
        encode_rgba_png(&image).expect("encode")
    );

    fs::remove_dir_all(dir).expect("cleanup");
}

#[test]
fn malformed_clipboard_image_is_an_encode_error() {
    let dir = unique_dir("paste_bad");
    let clipboard = TestClipboard {
        image: Some(ClipboardImage {
            width: 3,
            height: 3,
            rgba: vec![0; 5],
        }),
        ..TestClipboard::default()
    };
    let mut controller = SessionController::new(TestEngine::ok("x"), clipboard, settings_in(&dir));

    let err = controller
        .load_from_clipboard(&SessionState::new())
        .expect_err("encode failure");
    assert!(matches!(err, SessionError::ImageEncode(_)));
    assert_eq!(controller.engine().calls(), 0);

    fs::remove_dir_all(dir).expect("cleanup");
}

#[test]
fn clipboard_read_failure_is_reported() {
    let dir = unique_dir("paste_read_fail");
    let clipboard = TestClipboard {
        fail_reads: true,
        ..TestClipboard::default()
    };
    let mut controller = SessionController::new(TestEngine::ok("x"), clipboard, settings_in(&dir));

    let err = controller
        .load_from_clipboard(&SessionState::new())
        .expect_err("read failure");
    assert!(matches!(err, SessionError::Clipboard(ClipboardError::Read(_))));

    fs::remove_dir_all(dir).expect("cleanup");
}

#[test]
fn copying_empty_text_changes_nothing() {
    let mut controller =
        SessionController::new(TestEngine::ok("x"), TestClipboard::default(), Settings::default());
    let state = SessionState {
        recognized: "x^2".to_string(),
        ..SessionState::new()
    };

    let outcome = controller.copy_current_text(&state).expect("copy");
    assert!(outcome.is_none());
    assert_eq!(controller.clipboard().writes, 0);
    assert!(controller.clipboard().text.is_none());
}

#[test]
fn copy_uses_the_edited_text_not_the_recognition() {
    let mut controller =
        SessionController::new(TestEngine::ok("x"), TestClipboard::default(), Settings::default());
    let state = SessionState {
        recognized: "x^2".to_string(),
        editor_text: "x^2".to_string(),
        ..SessionState::new()
    }
    .edited("x^{2}+1");
    assert!(state.is_edited());

    let next = controller
        .copy_current_text(&state)
        .expect("copy")
        .expect("non-empty text");
    assert_eq!(controller.clipboard().text.as_deref(), Some("x^{2}+1"));
    assert_eq!(next.status, COPIED_STATUS);
    assert_eq!(next.recognized, "x^{2}+1");
    assert_eq!(next.editor_text, "x^{2}+1");
    assert!(!next.is_edited());
}

#[test]
fn whitespace_only_text_is_still_copied() {
    let mut controller =
        SessionController::new(TestEngine::ok("x"), TestClipboard::default(), Settings::default());
    let state = SessionState::new().edited(" ");

    assert!(controller.copy_current_text(&state).expect("copy").is_some());
    assert_eq!(controller.clipboard().text.as_deref(), Some(" "));
}

#[test]
fn copying_twice_yields_the_same_clipboard_content() {
    let mut controller =
        SessionController::new(TestEngine::ok("x"), TestClipboard::default(), Settings::default());
    let state = SessionState::new().edited("\\pi r^2");

    let first = controller
        .copy_current_text(&state)
        .expect("copy")
        .expect("copied");
    let after_first = controller.clipboard().text.clone();
    let second = controller
        .copy_current_text(&first)
        .expect("copy")
        .expect("copied");

    assert_eq!(after_first.as_deref(), Some("\\pi r^2"));
    assert_eq!(controller.clipboard().text, after_first);
    assert_eq!(first, second);
    assert_eq!(controller.clipboard().writes, 2);
}

#[test]
fn clipboard_write_failure_keeps_status() {
    let clipboard = TestClipboard {
        fail_writes: true,
        ..TestClipboard::default()
    };
    let mut controller = SessionController::new(TestEngine::ok("x"), clipboard, Settings::default());
    let state = SessionState::new().edited("x");

    let err = controller
        .copy_current_text(&state)
        .expect_err("write failure");
    assert!(matches!(err, SessionError::Clipboard(ClipboardError::Write(_))));
    assert_eq!(state.status, INITIAL_STATUS);
}

#[test]
fn load_then_copy_end_to_end() {
    let dir = unique_dir("e2e");
    let path = write_png(&dir, "equation.png", &sample_image(8, 2));
    let mut controller =
        SessionController::new(TestEngine::ok("x^2+y^2=z^2"), TestClipboard::default(), settings_in(&dir));

    let loaded = controller
        .load_from_path(&SessionState::new(), &path)
        .expect("load");
    assert_eq!(loaded.editor_text, "x^2+y^2=z^2");

    let copied = controller
        .copy_current_text(&loaded)
        .expect("copy")
        .expect("copied");
    assert_eq!(controller.clipboard().text.as_deref(), Some("x^2+y^2=z^2"));
    assert_eq!(copied.status, "LaTeX code copied to clipboard!");

    fs::remove_dir_all(dir).expect("cleanup");
}
