// Copyright (C) 2026 The sboard authors
//
// This program is free software: you can redistribute it and/or modify it under
// the terms of the GNU General Public License as published by the Free Software
// Foundation, version 3.
//
// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with
// this program. If not, see <https://www.gnu.org/licenses/>.
//

//! The `.ssf` sampler state format: a UTF-8 XML document with a
//! `SamplerState` root and one `Sample` element per configured sample.
//!
//! ```xml
//! <SamplerState>
//!   <Sample name="kick" file="kick.wav" key="97" loopType="0" volume="100" pan="0"/>
//! </SamplerState>
//! ```

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, Event};
use quick_xml::{Reader, Writer};
use tracing::debug;

use crate::sampler::{Key, LoopMode, MAX_CHANNELS};

/// The conventional state file extension.
pub const STATE_FILE_EXTENSION: &str = "ssf";

const ROOT_TAG: &str = "SamplerState";
const SAMPLE_TAG: &str = "Sample";

/// One persisted sample: everything needed to reconstruct a `Sample` except
/// its channel index, which is assigned positionally on load.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleRecord {
    pub name: String,
    pub file: PathBuf,
    pub key: Key,
    pub loop_mode: LoopMode,
    pub volume: i32,
    pub pan: i32,
}

/// Errors reading or writing a state file. Every variant is recoverable:
/// the caller reports it to the user and abandons the operation, leaving
/// in-memory state untouched.
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("state file I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("document is not well-formed XML: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("invalid document syntax: {0}")]
    Syntax(String),

    #[error("document has no {ROOT_TAG} root element")]
    MissingRoot,

    #[error("sample record is missing the {0:?} attribute")]
    MissingAttribute(&'static str),

    #[error("sample attribute {attribute:?} has invalid value {value:?}")]
    InvalidAttribute {
        attribute: &'static str,
        value: String,
    },

    #[error("document holds {0} samples, which exceeds the channel limit")]
    TooManySamples(usize),
}

/// Renders the given records as a state document.
pub fn render(records: &[SampleRecord]) -> Result<Vec<u8>, StateError> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
    writer.write_event(Event::Start(BytesStart::new(ROOT_TAG)))?;

    for record in records {
        let mut element = BytesStart::new(SAMPLE_TAG);
        element.push_attribute(("name", record.name.as_str()));
        element.push_attribute(("file", record.file.to_string_lossy().as_ref()));
        element.push_attribute(("key", record.key.code().to_string().as_str()));
        element.push_attribute(("loopType", record.loop_mode.code().to_string().as_str()));
        element.push_attribute(("volume", record.volume.to_string().as_str()));
        element.push_attribute(("pan", record.pan.to_string().as_str()));
        writer.write_event(Event::Empty(element))?;
    }

    writer.write_event(Event::End(BytesEnd::new(ROOT_TAG)))?;
    Ok(writer.into_inner())
}

/// Writes the given records to a state file. The document is written to a
/// temporary file in the destination directory and renamed over the target,
/// so a failed save never leaves a partial file behind.
pub fn write_state(path: &Path, records: &[SampleRecord]) -> Result<(), StateError> {
    let document = render(records)?;

    let directory = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let temp_path = directory.join(format!(
        ".{}.tmp",
        path.file_name()
            .and_then(|name| name.to_str())
            .unwrap_or("state.ssf")
    ));

    fs::write(&temp_path, &document)?;
    if let Err(e) = fs::rename(&temp_path, path) {
        let _ = fs::remove_file(&temp_path);
        return Err(e.into());
    }

    debug!(path = %path.display(), samples = records.len(), "State written");
    Ok(())
}

/// Reads a state file.
pub fn read_state(path: &Path) -> Result<Vec<SampleRecord>, StateError> {
    parse(&fs::read_to_string(path)?)
}

/// Parses a state document. The whole document is validated before anything
/// is returned, so a malformed file never yields a partial sample list.
pub fn parse(text: &str) -> Result<Vec<SampleRecord>, StateError> {
    let mut reader = Reader::from_str(text);
    reader.config_mut().trim_text(true);

    let mut records = Vec::new();
    let mut root_seen = false;

    loop {
        match reader.read_event()? {
            Event::Start(element) | Event::Empty(element) => {
                if !root_seen {
                    if element.name().as_ref() != ROOT_TAG.as_bytes() {
                        return Err(StateError::MissingRoot);
                    }
                    root_seen = true;
                } else if element.name().as_ref() == SAMPLE_TAG.as_bytes() {
                    records.push(parse_sample(&element)?);
                }
                // Unknown elements under the root are ignored.
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if !root_seen {
        return Err(StateError::MissingRoot);
    }
    if records.len() > MAX_CHANNELS {
        return Err(StateError::TooManySamples(records.len()));
    }

    Ok(records)
}

fn parse_sample(element: &BytesStart) -> Result<SampleRecord, StateError> {
    let mut name = None;
    let mut file = None;
    let mut key = None;
    let mut loop_mode = None;
    let mut volume = None;
    let mut pan = None;

    for attribute in element.attributes() {
        let attribute = attribute.map_err(|e| StateError::Syntax(e.to_string()))?;
        let value = attribute
            .unescape_value()
            .map_err(|e| StateError::Syntax(e.to_string()))?;

        match attribute.key.as_ref() {
            b"name" => name = Some(value.into_owned()),
            b"file" => file = Some(PathBuf::from(value.into_owned())),
            b"key" => key = Some(Key::from_code(parse_attribute("key", &value)?)),
            b"loopType" => {
                loop_mode = Some(LoopMode::from_code(parse_attribute("loopType", &value)?))
            }
            b"volume" => volume = Some(parse_attribute("volume", &value)?),
            b"pan" => pan = Some(parse_attribute("pan", &value)?),
            _ => {}
        }
    }

    Ok(SampleRecord {
        name: name.ok_or(StateError::MissingAttribute("name"))?,
        file: file.ok_or(StateError::MissingAttribute("file"))?,
        key: key.ok_or(StateError::MissingAttribute("key"))?,
        loop_mode: loop_mode.ok_or(StateError::MissingAttribute("loopType"))?,
        volume: volume.ok_or(StateError::MissingAttribute("volume"))?,
        pan: pan.ok_or(StateError::MissingAttribute("pan"))?,
    })
}

fn parse_attribute<T: FromStr>(attribute: &'static str, value: &str) -> Result<T, StateError> {
    value
        .trim()
        .parse()
        .map_err(|_| StateError::InvalidAttribute {
            attribute,
            value: value.to_string(),
        })
}

#[cfg(test)]
mod test {
    use super::*;

    fn make_records() -> Vec<SampleRecord> {
        vec![
            SampleRecord {
                name: "kick".to_string(),
                file: "sounds/kick.wav".into(),
                key: Key::from_char('a'),
                loop_mode: LoopMode::OneShot,
                volume: 100,
                pan: 0,
            },
            SampleRecord {
                name: "<ambience> & \"rain\"".to_string(),
                file: "rain.flac".into(),
                key: Key::function(5),
                loop_mode: LoopMode::AutoLoop,
                volume: 40,
                pan: -75,
            },
        ]
    }

    #[test]
    fn test_round_trip() {
        let records = make_records();
        let document = render(&records).expect("render failed");
        let parsed = parse(std::str::from_utf8(&document).expect("not UTF-8"))
            .expect("parse failed");
        assert_eq!(parsed, records);
    }

    #[test]
    fn test_file_round_trip() {
        let dir = tempfile::tempdir().expect("failed to create temp dir");
        let path = dir.path().join("test.ssf");

        let records = make_records();
        write_state(&path, &records).expect("write failed");
        assert_eq!(read_state(&path).expect("read failed"), records);

        // The temporary write file must not survive.
        assert_eq!(
            std::fs::read_dir(dir.path())
                .expect("read_dir failed")
                .count(),
            1
        );
    }

    #[test]
    fn test_empty_state() {
        let document = render(&[]).expect("render failed");
        let parsed =
            parse(std::str::from_utf8(&document).expect("not UTF-8")).expect("parse failed");
        assert!(parsed.is_empty());
    }

    #[test]
    fn test_missing_root() {
        assert!(matches!(
            parse("<SomethingElse></SomethingElse>"),
            Err(StateError::MissingRoot)
        ));
        assert!(matches!(parse(""), Err(StateError::MissingRoot)));
        assert!(matches!(parse("just some text"), Err(StateError::MissingRoot)));
    }

    #[test]
    fn test_not_well_formed() {
        assert!(parse("<SamplerState><Sample name=\"x\"").is_err());
        assert!(parse("<SamplerState></WrongClose>").is_err());
    }

    #[test]
    fn test_missing_attribute() {
        let document = r#"<SamplerState><Sample name="kick" file="kick.wav" key="97" loopType="0" volume="100"/></SamplerState>"#;
        assert!(matches!(
            parse(document),
            Err(StateError::MissingAttribute("pan"))
        ));
    }

    #[test]
    fn test_invalid_attribute() {
        let document = r#"<SamplerState><Sample name="kick" file="kick.wav" key="not-a-key" loopType="0" volume="100" pan="0"/></SamplerState>"#;
        assert!(matches!(
            parse(document),
            Err(StateError::InvalidAttribute { attribute: "key", .. })
        ));
    }

    #[test]
    fn test_nonzero_loop_type_is_auto_loop() {
        let document = r#"<SamplerState><Sample name="x" file="x.wav" key="97" loopType="3" volume="100" pan="0"/></SamplerState>"#;
        let parsed = parse(document).expect("parse failed");
        assert_eq!(parsed[0].loop_mode, LoopMode::AutoLoop);
    }

    #[test]
    fn test_too_many_samples() {
        let records: Vec<SampleRecord> = (0..MAX_CHANNELS + 1)
            .map(|i| SampleRecord {
                name: format!("sample{}", i),
                file: format!("sample{}.wav", i).into(),
                key: Key::from_char('a'),
                loop_mode: LoopMode::OneShot,
                volume: 100,
                pan: 0,
            })
            .collect();
        let document = render(&records).expect("render failed");
        assert!(matches!(
            parse(std::str::from_utf8(&document).expect("not UTF-8")),
            Err(StateError::TooManySamples(n)) if n == MAX_CHANNELS + 1
        ));
    }

    #[test]
    fn test_unknown_elements_and_attributes_ignored() {
        let document = r#"<SamplerState>
            <Metadata author="someone"/>
            <Sample name="kick" file="kick.wav" key="97" loopType="0" volume="100" pan="0" color="red"/>
        </SamplerState>"#;
        let parsed = parse(document).expect("parse failed");
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].name, "kick");
    }

    #[test]
    fn test_failed_write_leaves_existing_file_intact() {
        let dir = tempfile::tempdir().expect("failed to create temp dir");
        let path = dir.path().join("state.ssf");
        write_state(&path, &make_records()).expect("write failed");
        let before = std::fs::read(&path).expect("read failed");

        // Writing over a path whose name is taken by a directory fails at
        // the rename. The failed save must clean up its temporary file and
        // leave every existing document alone.
        let blocked = dir.path().join("blocked");
        std::fs::create_dir(&blocked).expect("mkdir failed");
        assert!(write_state(&blocked, &[]).is_err());

        assert_eq!(std::fs::read(&path).expect("read failed"), before);
        let entries: Vec<_> = std::fs::read_dir(dir.path())
            .expect("read_dir failed")
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.file_name())
            .collect();
        assert_eq!(entries.len(), 2, "stray files left behind: {:?}", entries);
    }

    #[test]
    fn test_read_missing_file() {
        assert!(matches!(
            read_state(Path::new("/nonexistent/state.ssf")),
            Err(StateError::Io(_))
        ));
    }
}
