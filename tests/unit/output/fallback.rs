use std::sync::Mutex;

use super::*;
use crate::assets::source::ImageSource;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Step {
    Share,
    Clipboard,
    Download,
}

#[derive(Clone, Copy)]
enum Behavior {
    Ok,
    Unavailable,
    Broken,
}

struct ScriptedDispatcher {
    share: Behavior,
    clipboard: Behavior,
    calls: Mutex<Vec<Step>>,
}

impl ScriptedDispatcher {
    fn new(share: Behavior, clipboard: Behavior) -> Self {
        Self {
            share,
            clipboard,
            calls: Mutex::new(Vec::new()),
        }
    }

    fn calls(&self) -> Vec<Step> {
        self.calls.lock().unwrap().clone()
    }
}

impl OutputDispatcher for ScriptedDispatcher {
    fn capabilities(&self) -> Capabilities {
        Capabilities {
            clipboard: matches!(self.clipboard, Behavior::Ok),
            share: matches!(self.share, Behavior::Ok),
        }
    }

    fn download(&self, _poster: &RenderedPoster, campaign_prefix: &str) -> PosterResult<PathBuf> {
        self.calls.lock().unwrap().push(Step::Download);
        Ok(PathBuf::from(format!("{campaign_prefix}-Poster-1.png")))
    }

    fn copy_to_clipboard(&self, _poster: &RenderedPoster) -> PosterResult<()> {
        self.calls.lock().unwrap().push(Step::Clipboard);
        match self.clipboard {
            Behavior::Ok => Ok(()),
            Behavior::Unavailable => Err(PosterError::clipboard_unavailable("no ClipboardItem")),
            Behavior::Broken => Err(PosterError::encode("png decode: truncated")),
        }
    }

    fn share(&self, _poster: &RenderedPoster, content: &ShareContent) -> PosterResult<()> {
        assert_eq!(content.title, "My GCCD 2025 Poster");
        self.calls.lock().unwrap().push(Step::Share);
        match self.share {
            Behavior::Ok => Ok(()),
            Behavior::Unavailable => Err(PosterError::share_unavailable("no navigator.share")),
            Behavior::Broken => Err(PosterError::Io(std::io::Error::other("share sheet crashed"))),
        }
    }
}

fn poster() -> RenderedPoster {
    RenderedPoster::encode_rgba8(1, 1, vec![10, 20, 30, 255]).unwrap()
}

fn template() -> PosterTemplate {
    PosterTemplate::reference("poster1", ImageSource::Path("templates/poster1.png".into()))
}

#[test]
fn native_share_wins_when_available() {
    let d = ScriptedDispatcher::new(Behavior::Ok, Behavior::Ok);
    let out = share_with_fallback(&d, &poster(), &template()).unwrap();
    assert_eq!(out, ShareOutcome::Shared);
    assert_eq!(d.calls(), [Step::Share]);
}

#[test]
fn clipboard_is_tried_when_share_is_unavailable() {
    let d = ScriptedDispatcher::new(Behavior::Unavailable, Behavior::Ok);
    let out = share_with_fallback(&d, &poster(), &template()).unwrap();
    assert_eq!(out, ShareOutcome::Clipboard);
    assert_eq!(d.calls(), [Step::Share, Step::Clipboard]);
}

#[test]
fn download_is_the_last_resort() {
    let d = ScriptedDispatcher::new(Behavior::Unavailable, Behavior::Unavailable);
    let out = share_with_fallback(&d, &poster(), &template()).unwrap();
    assert_eq!(out.kind(), "download");
    assert_eq!(out.path(), Some(std::path::Path::new("GCCD-2025-Poster-1.png")));
    assert_eq!(d.calls(), [Step::Share, Step::Clipboard, Step::Download]);
    assert_eq!(serde_json::to_string(&out).unwrap(), "\"download\"");
}

#[test]
fn non_capability_errors_stop_the_chain() {
    let d = ScriptedDispatcher::new(Behavior::Broken, Behavior::Ok);
    let err = share_with_fallback(&d, &poster(), &template()).unwrap_err();
    assert!(matches!(err, PosterError::Io(_)));
    assert_eq!(d.calls(), [Step::Share]);

    let d = ScriptedDispatcher::new(Behavior::Unavailable, Behavior::Broken);
    let err = share_with_fallback(&d, &poster(), &template()).unwrap_err();
    assert!(matches!(err, PosterError::Encode(_)));
    assert_eq!(d.calls(), [Step::Share, Step::Clipboard]);
}

#[test]
fn outcomes_serialize_as_tags_and_confirm() {
    assert_eq!(serde_json::to_string(&ShareOutcome::Shared).unwrap(), "\"shared\"");
    assert_eq!(
        serde_json::to_string(&ShareOutcome::Clipboard).unwrap(),
        "\"clipboard\""
    );
    assert!(ShareOutcome::Clipboard.confirmation().contains("paste"));
    let dl = ShareOutcome::Download {
        path: PathBuf::from("out/x.png"),
    };
    assert!(dl.confirmation().contains("x.png"));
}

#[test]
fn file_dispatcher_reports_no_capabilities_and_falls_through() {
    let dir = tempfile::tempdir().unwrap();
    let d = FileDispatcher::new(dir.path().join("downloads"));
    assert_eq!(d.capabilities(), Capabilities::default());

    let out = share_with_fallback(&d, &poster(), &template()).unwrap();
    let path = out.path().unwrap();
    assert_eq!(path.parent(), Some(d.dir()));
    let name = path.file_name().unwrap().to_string_lossy().into_owned();
    assert!(name.starts_with("GCCD-2025-Poster-"), "{name}");
    assert!(name.ends_with(".png"));
    assert_eq!(std::fs::read(path).unwrap(), poster().png_bytes());
}

#[test]
fn taken_names_move_forward_one_millisecond() {
    let dir = tempfile::tempdir().unwrap();
    let d = FileDispatcher::new(dir.path());
    let p = poster();

    let first = d.download_at(&p, "GCCD-2025", 1_000).unwrap();
    let second = d.download_at(&p, "GCCD-2025", 1_000).unwrap();
    assert_eq!(first, dir.path().join("GCCD-2025-Poster-1000.png"));
    assert_eq!(second, dir.path().join("GCCD-2025-Poster-1001.png"));
}

#[test]
fn probe_always_yields_a_downloader() {
    let dir = tempfile::tempdir().unwrap();
    let d = probe_dispatcher(dir.path());
    let path = d.download(&poster(), "GCCD-2025").unwrap();
    assert!(path.starts_with(dir.path()));
}
