//! Fake console for integration tests
//!
//! A `/bin/sh` script that understands enough of the console language to
//! loop published messages back to their subscribers. It supports `pubtags`,
//! `subtags`, `ohex`, `ostr`, `pubstr` (string output only), `pub`, `pubatt`
//! and `exit`, and reports unknown commands on stderr.

use std::path::PathBuf;
use tempfile::TempDir;
use tips_console::ConsoleClient;

const FAKE_CONSOLE: &str = r#"fmt=hex
subs=" "
echo "[status] Session started" >&2
while IFS= read -r line; do
  set -- $line
  [ $# -eq 0 ] && continue
  cmd=$1
  shift
  case "$cmd" in
    pubtags) ;;
    subtags) for t in "$@"; do subs="$subs$t "; done ;;
    ohex) fmt=hex ;;
    ostr) fmt=str ;;
    pubstr)
      tag=$1
      text=${line#pubstr }
      text=${text#"$tag" }
      if [ "$fmt" != str ]; then
        echo "[status] pubstr only looped back in ostr mode" >&2
        continue
      fi
      case "$subs" in *" $tag "*) echo "$tag msgstr= $text" ;; esac ;;
    pub)
      tag=$1
      shift 2
      case "$subs" in *" $tag "*) echo "$tag msg= $*" | tr 'A-F' 'a-f' ;; esac ;;
    pubatt)
      tag=$1
      n=$2
      shift 3
      msg=""
      att=""
      i=0
      for b in "$@"; do
        if [ $i -lt $n ]; then msg="$msg $b"; else att="$att $b"; fi
        i=$((i+1))
      done
      case "$subs" in *" $tag "*) printf '%s msgatt=%s\natt=%s\n' "$tag" "$msg" "$att" | tr 'A-F' 'a-f' ;; esac ;;
    exit)
      echo "[status] Session stopped" >&2
      exit 0 ;;
    *) echo "unknown command: $cmd" >&2 ;;
  esac
done
echo "[status] Session stopped" >&2
"#;

/// A fake console script living in a temporary directory
pub struct FakeConsole {
    _dir: TempDir,
    script: PathBuf,
}

impl FakeConsole {
    /// Write the script to a fresh temporary directory
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let script = dir.path().join("fake-tips-console.sh");
        std::fs::write(&script, FAKE_CONSOLE).expect("Failed to write fake console");
        Self { _dir: dir, script }
    }

    /// Command line running the script through `sh`
    pub fn command_line(&self) -> Vec<String> {
        vec!["sh".to_string(), self.script.to_string_lossy().into_owned()]
    }

    /// Start a client session against the script
    pub fn spawn(&self) -> ConsoleClient {
        ConsoleClient::spawn(self.command_line()).expect("Failed to spawn fake console")
    }
}
