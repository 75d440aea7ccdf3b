//! zkim — command-line front end for the ZKIM secure container format.
//!
//! Usage:
//!   zkim keygen --out <file>
//!   zkim create --payload <file> --user <user_id> --platform-key <hex> --user-key <hex> --store <dir> [--name <name>] [--mime <type>]
//!   zkim decrypt --object-id <id> --user <user_id> --user-key <hex> --store <dir> --out <file>
//!   zkim validate --object-id <id> --user-key <hex> --store <dir>
//!   zkim search --query <text> --user <user_id> --store <dir> [--limit <n>]
//!   zkim inspect --in <file>
//!
//! Hand-rolled flag parsing rather than a full argument-parsing crate —
//! this binary's surface is small and fixed enough not to need one.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use zkim_core::config::ZkimConfig;
use zkim_core::container::{Container, FileId, ObjectId};
use zkim_core::metadata::Metadata;
use zkim_core::service::FileService;
use zkim_core::storage::FileBackend;
use zkim_core::wire;
use zkim_index::{IndexConfig, SearchableIndex};

fn usage() -> ! {
    eprintln!(
        "zkim — secure container tooling\n\
         \n\
         Commands:\n\
         \n\
         zkim keygen --out <file>\n\
         \tWrites 32 random bytes, hex-encoded, to <file>.\n\
         \n\
         zkim create --payload <file> --user <id> --platform-key <hex> --user-key <hex> --store <dir> [--name <name>] [--mime <type>]\n\
         \tEncrypts <file> into a new container and persists it under <dir>.\n\
         \n\
         zkim decrypt --object-id <id> --user <id> --user-key <hex> --store <dir> --out <file>\n\
         \tRecovers the original plaintext and writes it to <file>.\n\
         \n\
         zkim validate --object-id <id> --user-key <hex> --store <dir>\n\
         \tPrints the integrity/signature validation report.\n\
         \n\
         zkim search --query <text> --user <id> --store <dir> [--limit <n>]\n\
         \tRe-indexes every container's sidecar metadata in <dir> and searches it.\n\
         \n\
         zkim inspect --in <file>\n\
         \tParses a wire-format file directly and prints its header fields.\n"
    );
    std::process::exit(1);
}

fn die(msg: impl AsRef<str>) -> ! {
    eprintln!("error: {}", msg.as_ref());
    std::process::exit(1);
}

struct Flags(Vec<(String, String)>);

impl Flags {
    fn parse(args: &[String]) -> Self {
        let mut flags = Vec::new();
        let mut i = 0;
        while i < args.len() {
            if let Some(name) = args[i].strip_prefix("--") {
                if i + 1 >= args.len() {
                    die(format!("flag --{name} expects a value"));
                }
                flags.push((name.to_string(), args[i + 1].clone()));
                i += 2;
            } else {
                die(format!("unexpected argument: {}", args[i]));
            }
        }
        Self(flags)
    }

    fn get(&self, name: &str) -> Option<&str> {
        self.0.iter().find(|(k, _)| k == name).map(|(_, v)| v.as_str())
    }

    fn require(&self, name: &str) -> &str {
        self.get(name).unwrap_or_else(|| die(format!("missing required flag: --{name}")))
    }
}

fn parse_key(hex_str: &str, flag: &str) -> [u8; 32] {
    let bytes = hex::decode(hex_str).unwrap_or_else(|_| die(format!("--{flag} is not valid hex")));
    bytes
        .try_into()
        .unwrap_or_else(|b: Vec<u8>| die(format!("--{flag} must decode to 32 bytes, got {}", b.len())))
}

fn sidecar_path(store: &Path, object_id: &str) -> PathBuf {
    store.join(format!("{}.meta.json", sanitize(object_id)))
}

fn sanitize(key: &str) -> String {
    key.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect()
}

fn write_sidecar(store: &Path, object_id: &str, metadata: &Metadata) {
    let json = serde_json::to_string_pretty(metadata).unwrap_or_else(|e| die(format!("serialize metadata: {e}")));
    fs::write(sidecar_path(store, object_id), json).unwrap_or_else(|e| die(format!("write sidecar: {e}")));
}

fn read_sidecar(store: &Path, object_id: &str) -> Metadata {
    let json = fs::read_to_string(sidecar_path(store, object_id))
        .unwrap_or_else(|e| die(format!("read sidecar for {object_id}: {e}")));
    serde_json::from_str(&json).unwrap_or_else(|e| die(format!("parse sidecar for {object_id}: {e}")))
}

fn load_container(store: &Path, object_id: &str) -> Container {
    let bytes_path = store.join(format!("{}.bin", sanitize(object_id)));
    let bytes = fs::read(&bytes_path).unwrap_or_else(|e| die(format!("read {}: {e}", bytes_path.display())));
    let wire_file = wire::parse(&bytes).unwrap_or_else(|e| die(format!("parse wire format: {e}")));
    Container {
        file_id: FileId(object_id.to_string()),
        object_id: ObjectId(object_id.to_string()),
        wire: wire_file,
        metadata: read_sidecar(store, object_id),
    }
}

fn cmd_keygen(flags: &Flags) {
    let out = flags.require("out");
    let key = zkim_core::crypto::rng::random_bytes(32);
    fs::write(out, hex::encode(&key)).unwrap_or_else(|e| die(format!("write {out}: {e}")));
    eprintln!("wrote 32-byte key to {out}");
}

async fn cmd_create(flags: &Flags) {
    let payload_path = flags.require("payload");
    let user_id = flags.require("user").to_string();
    let platform_key = parse_key(flags.require("platform-key"), "platform-key");
    let user_key = parse_key(flags.require("user-key"), "user-key");
    let store = PathBuf::from(flags.require("store"));
    let name = flags.get("name").unwrap_or(payload_path).to_string();
    let mime = flags.get("mime").unwrap_or("application/octet-stream").to_string();

    let payload = fs::read(payload_path).unwrap_or_else(|e| die(format!("read {payload_path}: {e}")));

    let backend = Arc::new(FileBackend::new(&store).unwrap_or_else(|e| die(format!("open store {}: {e}", store.display()))));
    let service = FileService::new(ZkimConfig::default(), backend);

    let mut metadata = Metadata::new(name, mime, &user_id);
    metadata.access_control.read.push(user_id.clone());
    metadata.access_control.write.push(user_id.clone());

    let result = service
        .create(&payload, &user_id, &platform_key, &user_key, Some(metadata), false)
        .await
        .unwrap_or_else(|e| die(format!("create failed: {e}")));

    write_sidecar(&store, &result.object_id.0, &result.container.metadata);

    eprintln!(
        "created {} (original {} bytes, compressed {} bytes, encrypted {} bytes, {:?})",
        result.object_id.0, result.original_size, result.compressed_size, result.encrypted_size, result.elapsed
    );
    for warning in &result.warnings {
        eprintln!("warning: {warning}");
    }
    println!("{}", result.object_id.0);
}

async fn cmd_decrypt(flags: &Flags) {
    let object_id = flags.require("object-id");
    let user_id = flags.require("user");
    let user_key = parse_key(flags.require("user-key"), "user-key");
    let store = PathBuf::from(flags.require("store"));
    let out = flags.require("out");

    let backend = Arc::new(FileBackend::new(&store).unwrap_or_else(|e| die(format!("open store {}: {e}", store.display()))));
    let service = FileService::new(ZkimConfig::default(), backend);
    let container = load_container(&store, object_id);

    let plaintext = service
        .decrypt(&container, user_id, &user_key)
        .await
        .unwrap_or_else(|e| die(format!("decrypt failed: {e}")));

    fs::write(out, &plaintext).unwrap_or_else(|e| die(format!("write {out}: {e}")));
    eprintln!("decrypted {object_id} -> {out} ({} bytes)", plaintext.len());
}

async fn cmd_validate(flags: &Flags) {
    let object_id = flags.require("object-id");
    let user_key = parse_key(flags.require("user-key"), "user-key");
    let store = PathBuf::from(flags.require("store"));

    let backend = Arc::new(FileBackend::new(&store).unwrap_or_else(|e| die(format!("open store {}: {e}", store.display()))));
    let service = FileService::new(ZkimConfig::default(), backend);
    let container = load_container(&store, object_id);

    let report = service.validate_integrity(&container, &user_key);
    println!("is_valid:         {}", report.is_valid);
    println!("level:            {:?}", report.level);
    println!("header_valid:     {}", report.header_valid);
    println!("chunks_valid:     {}", report.chunks_valid);
    println!("signatures_valid: {}", report.signatures_valid);
    println!("metadata_valid:   {}", report.metadata_valid);
    println!("elapsed:          {:?}", report.elapsed);
    for error in &report.errors {
        println!("error:   {error}");
    }
    for warning in &report.warnings {
        println!("warning: {warning}");
    }
}

async fn cmd_search(flags: &Flags) {
    let query = flags.require("query");
    let user_id = flags.require("user");
    let store = PathBuf::from(flags.require("store"));
    let limit = flags.get("limit").map(|s| s.parse::<usize>().unwrap_or_else(|_| die("--limit must be a number")));

    let index = SearchableIndex::new(IndexConfig::default());
    let entries = fs::read_dir(&store).unwrap_or_else(|e| die(format!("read store {}: {e}", store.display())));
    for entry in entries.flatten() {
        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) != Some("json") {
            continue;
        }
        let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else { continue };
        let object_id = stem.trim_end_matches(".meta");
        let metadata = read_sidecar(&store, object_id);
        index.index_file(object_id, object_id, &metadata).await.unwrap_or_else(|e| die(format!("index {object_id}: {e}")));
    }

    let results = index.search(query, user_id, limit).await.unwrap_or_else(|e| die(format!("search failed: {e}")));
    for result in &results {
        println!("{}\t{:.3}\t{}", result.file_id, result.relevance, result.access_level);
    }
    eprintln!("{} result(s)", results.len());
}

fn cmd_inspect(flags: &Flags) {
    let path = flags.require("in");
    let bytes = fs::read(path).unwrap_or_else(|e| die(format!("read {path}: {e}")));
    let wire_file = wire::parse(&bytes).unwrap_or_else(|e| die(format!("parse failed: {e}")));

    let mut fields = BTreeMap::new();
    fields.insert("file_bytes", bytes.len().to_string());
    fields.insert("kem_ciphertext_bytes", wire_file.kem_ciphertext.len().to_string());
    fields.insert("chunk_count", wire_file.chunks.len().to_string());
    fields.insert("merkle_root", hex::encode(wire_file.merkle_root));
    fields.insert("signature_bytes", wire_file.file_signature.len().to_string());

    for (key, value) in fields {
        println!("{key}: {value}");
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt().with_env_filter(tracing_subscriber::EnvFilter::from_default_env()).init();

    let args: Vec<String> = std::env::args().collect();
    if args.len() < 2 {
        usage();
    }
    let command = args[1].clone();
    let flags = Flags::parse(&args[2..]);

    match command.as_str() {
        "keygen" => cmd_keygen(&flags),
        "create" => cmd_create(&flags).await,
        "decrypt" => cmd_decrypt(&flags).await,
        "validate" => cmd_validate(&flags).await,
        "search" => cmd_search(&flags).await,
        "inspect" => cmd_inspect(&flags),
        "--help" | "-h" => usage(),
        other => {
            eprintln!("unknown command: {other}");
            usage();
        }
    }

    ExitCode::SUCCESS
}
