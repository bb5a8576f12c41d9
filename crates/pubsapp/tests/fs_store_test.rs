use pubsapp::bibtex::BibEntry;
use pubsapp::config::PubsConfig;
use pubsapp::error::{PubsError, Result};
use pubsapp::events::Event;
use pubsapp::model::{Metadata, Paper};
use pubsapp::repo::Repository;
use pubsapp::store::fs_backend::FsContentStore;
use pubsapp::store::{ContentStore, OnMissing, Transfer};
use std::cell::RefCell;
use std::fs;
use std::path::Path;
use std::rc::Rc;
use tempfile::TempDir;

fn setup() -> (TempDir, PubsConfig, Repository<FsContentStore>) {
    let dir = TempDir::new().unwrap();
    let config = PubsConfig {
        pubsdir: dir.path().join("pubs"),
        ..Default::default()
    };
    let repo = Repository::init(&config).unwrap();
    (dir, config, repo)
}

fn paper(citekey: &str) -> Paper {
    let mut entry = BibEntry::new("article");
    entry.add_field("author", "Shannon, Claude E.");
    entry.add_field("title", "A Mathematical Theory of {Communication}");
    entry.add_field("year", "1948");
    Paper::new(citekey, entry, Metadata::default())
}

fn assert_no_tmp_files(dir: &Path) {
    for entry in fs::read_dir(dir).unwrap() {
        let name = entry.unwrap().file_name().to_string_lossy().into_owned();
        assert!(!name.ends_with(".tmp"), "Found leftover tmp file: {}", name);
    }
}

#[test]
fn test_open_requires_init() {
    let dir = TempDir::new().unwrap();
    let config = PubsConfig {
        pubsdir: dir.path().join("nothing-here"),
        ..Default::default()
    };
    assert!(matches!(
        Repository::open(&config),
        Err(PubsError::Store(_))
    ));
}

#[test]
fn test_push_writes_layout() {
    let (dir, _config, mut repo) = setup();
    repo.push(&mut paper("shannon1948"), false, false).unwrap();

    let root = dir.path().join("pubs");
    let bib = fs::read_to_string(root.join("bib/shannon1948.bib")).unwrap();
    assert!(bib.starts_with("@article{shannon1948,"));
    assert!(bib.contains("{Communication}"));

    let meta = fs::read_to_string(root.join("meta/shannon1948.yaml")).unwrap();
    assert!(meta.contains("added:"));
    assert!(meta.contains("tags: []"));

    assert_no_tmp_files(&root.join("bib"));
    assert_no_tmp_files(&root.join("meta"));
}

#[test]
fn test_reopen_sees_pushed_papers() {
    let (_dir, config, mut repo) = setup();
    let mut original = paper("shannon1948");
    original.add_tag("information");
    repo.push(&mut original, false, false).unwrap();
    drop(repo);

    let mut reopened = Repository::open(&config).unwrap();
    assert_eq!(reopened.len().unwrap(), 1);
    assert_eq!(reopened.pull("shannon1948").unwrap(), original);
}

#[test]
fn test_hand_written_files_are_read() {
    let (dir, config, _repo) = setup();
    let root = dir.path().join("pubs");
    fs::write(
        root.join("bib/knuth1984.bib"),
        "% from a colleague\n@Article{whatever,\n  Author = \"Knuth, Donald\",\n  Title = {Literate Programming},\n  Year = 1984\n}\n",
    )
    .unwrap();
    fs::write(root.join("meta/knuth1984.yaml"), "tags: [literate]\n").unwrap();

    let repo = Repository::open(&config).unwrap();
    let paper = repo.pull("knuth1984").unwrap();
    assert_eq!(paper.bibentry().title(), Some("Literate Programming"));
    assert!(paper.bibdata().contains_key("knuth1984"));
    assert!(paper.tags().contains("literate"));
    assert_eq!(paper.added(), None);
}

#[test]
fn test_half_written_paper_is_hidden_but_blocks_key() {
    let (dir, config, _repo) = setup();
    let root = dir.path().join("pubs");
    fs::write(root.join("bib/half.bib"), "@misc{half}\n").unwrap();

    let mut repo = Repository::open(&config).unwrap();
    assert!(!repo.contains("half").unwrap());
    assert!(matches!(
        repo.pull("half"),
        Err(PubsError::InvalidReference(_))
    ));
    assert!(matches!(
        repo.push(&mut paper("half"), false, false),
        Err(PubsError::CiteKeyCollision(_))
    ));

    let report = repo.doctor(true).unwrap();
    assert_eq!(report.bib_without_meta, vec!["half"]);
    assert!(repo.contains("half").unwrap());
}

#[test]
fn test_remove_event_precedes_deletion() {
    let (dir, _config, mut repo) = setup();
    repo.push(&mut paper("k"), false, false).unwrap();

    let bib_path = dir.path().join("pubs/bib/k.bib");
    let seen = Rc::new(RefCell::new(None));
    let probe = Rc::clone(&seen);
    repo.register_listener(Box::new(move |event: &Event| -> Result<()> {
        if let Event::Remove { .. } = event {
            *probe.borrow_mut() = Some(bib_path.exists());
        }
        Ok(())
    }));

    repo.remove("k", true, true).unwrap();
    assert_eq!(*seen.borrow(), Some(true));
    assert!(!dir.path().join("pubs/bib/k.bib").exists());
}

#[test]
fn test_copied_document_lifecycle() {
    let (dir, _config, mut repo) = setup();
    repo.push(&mut paper("old"), false, false).unwrap();
    let source = dir.path().join("download.pdf");
    fs::write(&source, b"%PDF-1.7 bytes").unwrap();

    let attached = repo.push_doc("old", &source, Some(true)).unwrap();
    assert_eq!(attached.docpath(), Some("docsdir://old.pdf"));
    assert!(source.exists());
    let managed = dir.path().join("pubs/doc/old.pdf");
    assert_eq!(fs::read(&managed).unwrap(), b"%PDF-1.7 bytes");
    assert_eq!(repo.real_docpath(&attached), Some(managed.clone()));

    let mut p = repo.pull("old").unwrap();
    repo.rename(&mut p, "new", "old").unwrap();
    assert!(!managed.exists());
    assert!(dir.path().join("pubs/doc/new.pdf").exists());

    repo.remove("new", true, false).unwrap();
    assert!(!dir.path().join("pubs/doc/new.pdf").exists());
    assert_no_tmp_files(&dir.path().join("pubs/doc"));
}

#[test]
fn test_linked_document_is_never_deleted() {
    let (dir, _config, mut repo) = setup();
    repo.push(&mut paper("k"), false, false).unwrap();
    let source = dir.path().join("library").join("paper.pdf");
    fs::create_dir_all(source.parent().unwrap()).unwrap();
    fs::write(&source, b"pdf").unwrap();

    let linked = repo.push_doc("k", &source, Some(false)).unwrap();
    let docpath = linked.docpath().unwrap();
    assert!(Path::new(docpath).is_absolute());
    assert_eq!(fs::canonicalize(&source).unwrap(), Path::new(docpath));

    repo.remove("k", true, false).unwrap();
    assert!(source.exists());
}

#[test]
fn test_import_move_consumes_source() {
    let dir = TempDir::new().unwrap();
    let config = PubsConfig {
        pubsdir: dir.path().join("pubs"),
        import_move: true,
        ..Default::default()
    };
    let mut repo = Repository::init(&config).unwrap();
    repo.push(&mut paper("k"), false, false).unwrap();
    let source = dir.path().join("scan.djvu");
    fs::write(&source, b"djvu").unwrap();

    repo.push_doc("k", &source, None).unwrap();

    assert!(!source.exists());
    assert!(dir.path().join("pubs/doc/k.djvu").exists());
}

#[test]
fn test_add_doc_refuses_overwrite() {
    let (dir, _config, repo) = setup();
    let source = dir.path().join("a.pdf");
    fs::write(&source, b"a").unwrap();

    repo.store()
        .add_doc("k", &source, Transfer::Copy, false)
        .unwrap();
    assert!(matches!(
        repo.store().add_doc("k", &source, Transfer::Copy, false),
        Err(PubsError::AlreadyExists(_))
    ));
}

#[test]
fn test_remove_doc_on_missing_policy() {
    let (_dir, _config, repo) = setup();
    repo.store()
        .remove_doc("docsdir://ghost.pdf", OnMissing::Ignore)
        .unwrap();
    let err = repo
        .store()
        .remove_doc("docsdir://ghost.pdf", OnMissing::Fail)
        .unwrap_err();
    assert!(err.is_not_found());
}

#[test]
fn test_notes_follow_renames_and_use_configured_extension() {
    let dir = TempDir::new().unwrap();
    let config = PubsConfig {
        pubsdir: dir.path().join("pubs"),
        note_ext: "md".to_string(),
        ..Default::default()
    };
    let mut repo = Repository::init(&config).unwrap();
    repo.push(&mut paper("old"), false, false).unwrap();

    repo.push_note("old", "# Reading notes\n").unwrap();
    assert!(dir.path().join("pubs/notes/old.md").exists());

    let mut p = repo.pull("old").unwrap();
    repo.rename(&mut p, "new", "old").unwrap();
    assert_eq!(
        repo.pull_note("new").unwrap().as_deref(),
        Some("# Reading notes\n")
    );
    assert!(!dir.path().join("pubs/notes/old.md").exists());
}

#[test]
fn test_citekeys_ignore_stray_files() {
    let (dir, _config, mut repo) = setup();
    repo.push(&mut paper("real"), false, false).unwrap();
    let root = dir.path().join("pubs");
    fs::write(root.join("bib/.hidden.bib"), "").unwrap();
    fs::write(root.join("bib/readme.txt"), "").unwrap();
    fs::create_dir(root.join("bib/subdir.bib")).unwrap();

    let store = FsContentStore::new(&root);
    let keys: Vec<String> = store.bib_citekeys().unwrap().into_iter().collect();
    assert_eq!(keys, vec!["real"]);
    assert_eq!(repo.len().unwrap(), 1);
}

#[test]
fn test_traversal_citekeys_cannot_touch_outside_files() {
    let (dir, _config, mut repo) = setup();
    repo.push(&mut paper("shannon1948"), false, false).unwrap();
    let victim_bib = dir.path().join("victim.bib");
    let victim_yaml = dir.path().join("victim.yaml");
    fs::write(&victim_bib, "@misc{victim, title = {Not yours}}").unwrap();
    fs::write(&victim_yaml, "tags: []\n").unwrap();

    assert!(matches!(
        repo.remove("../../victim", true, true),
        Err(PubsError::InvalidCitekey { .. })
    ));
    assert!(matches!(
        repo.pull("../../victim"),
        Err(PubsError::InvalidReference(_))
    ));
    let mut p = repo.pull("shannon1948").unwrap();
    assert!(matches!(
        repo.rename(&mut p, "shannon48", "../../victim"),
        Err(PubsError::InvalidReference(_))
    ));

    assert!(victim_bib.exists());
    assert!(victim_yaml.exists());
    assert!(repo.contains("shannon1948").unwrap());
}
