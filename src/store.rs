use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Write};
use std::path::Path;

use crate::model::PriceListDocument;

/// Read a price-list document. Malformed JSON, including negative bed counts,
/// is reported as `InvalidData`.
pub fn load(path: &Path) -> io::Result<PriceListDocument> {
    let reader = BufReader::new(File::open(path)?);
    let doc: PriceListDocument =
        serde_json::from_reader(reader).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    for room in &doc.rooms {
        room.validate().map_err(|e| {
            io::Error::new(io::ErrorKind::InvalidData, format!("room {}: {e}", room.room_type_id))
        })?;
    }
    Ok(doc)
}

/// Write the document to a temp file, fsync, then rename it over `path`.
/// Readers never observe a half-written document. On failure the temp file
/// is removed and `path` is left as it was.
pub fn save(path: &Path, doc: &PriceListDocument, pretty: bool) -> io::Result<()> {
    let tmp_path = path.with_extension("json.tmp");
    let result = write_synced(&tmp_path, doc, pretty).and_then(|()| fs::rename(&tmp_path, path));
    if result.is_err() {
        let _ = fs::remove_file(&tmp_path);
    }
    result
}

fn write_synced(tmp_path: &Path, doc: &PriceListDocument, pretty: bool) -> io::Result<()> {
    let file = File::create(tmp_path)?;
    let mut writer = BufWriter::new(file);
    let result = if pretty {
        serde_json::to_writer_pretty(&mut writer, doc)
    } else {
        serde_json::to_writer(&mut writer, doc)
    };
    result.map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    writer.get_ref().sync_all()
}
