use std::fs;

use dvs::{decode_dtm, CodecError, Dtm, MAX_DTM_SIZE};
use log::debug;

type Result = std::result::Result<(), Box<dyn std::error::Error>>;

/// `dvs inspect <hex>` — Show the DTM and payload of a record.
pub fn inspect(hex_input: Option<&str>, file: Option<&str>, known: Option<usize>) -> Result {
    let data = match (hex_input, file) {
        (Some(input), _) => parse_hex(input)?,
        (None, Some(path)) => fs::read(path)?,
        (None, None) => return Err("provide the record as hex or with --file".into()),
    };
    debug!("inspecting {} bytes", data.len());

    for line in describe(&data, known)? {
        println!("{line}");
    }
    Ok(())
}

/// `dvs encode-dtm <dtm>` — Print the prefix bytes for a DTM.
pub fn encode_dtm(dtm: Dtm) -> Result {
    let mut buf = [0; MAX_DTM_SIZE];
    let n = dvs::encode_dtm(dtm, &mut buf)?;
    debug!("DTM {dtm} encodes to {n} bytes");
    println!("{}", hex::encode(&buf[..n]));
    Ok(())
}

fn describe(data: &[u8], known: Option<usize>) -> std::result::Result<Vec<String>, CodecError> {
    let (dtm, n) = decode_dtm(data)?;
    let payload = &data[n..];

    let mut lines = vec![
        format!("Size: {} bytes", data.len()),
        format!("DTM: {dtm}"),
        format!("Prefix: {n} bytes ({})", hex::encode(&data[..n])),
        format!("Payload: {} bytes", payload.len()),
    ];
    if !payload.is_empty() {
        lines.push(format!("  {}", hex::encode(payload)));
    }
    if let Some(known) = known {
        let status = if is_registered(dtm, known) {
            "registered"
        } else {
            "unknown"
        };
        lines.push(format!("Status: {status} (registry holds {known} versions)"));
    }
    Ok(lines)
}

fn is_registered(dtm: Dtm, known: usize) -> bool {
    usize::try_from(dtm).is_ok_and(|i| i < known)
}

fn parse_hex(input: &str) -> std::result::Result<Vec<u8>, hex::FromHexError> {
    let digits: String = input.chars().filter(|c| !c.is_whitespace()).collect();
    let digits = digits
        .strip_prefix("0x")
        .or_else(|| digits.strip_prefix("0X"))
        .unwrap_or(digits.as_str());
    hex::decode(digits)
}
