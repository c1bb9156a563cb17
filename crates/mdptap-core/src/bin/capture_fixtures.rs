use std::fs;
use std::path::{Path, PathBuf};

const MAGIC: [u8; 2] = [0x5A, 0x5A];
const HEADER_LEN: usize = 4;
const KIND_SYNTHESIZE: u8 = 0x11;
const KIND_WAVE: u8 = 0x12;
const KIND_HEARTBEAT: u8 = 0x22;
const SYNTHESIZE_SLOTS: u8 = 6;
const SLOT_LEN: usize = 25;
const WAVE_GROUPS: u32 = 10;
const ACTIVE_CHANNEL: u8 = 1;

const MACHINE_P906: u8 = 2;
const MACHINE_L1060: u8 = 3;

fn main() -> Result<(), String> {
    let root = PathBuf::from("tests/golden");

    let synthesize = synthesize_frame();
    let heartbeat = frame(KIND_HEARTBEAT, &[0xEE, 0x00]);
    let ambiguous = frame(KIND_WAVE, &[0x01, 0x00, 0x10, 0x20, 0x30, 0x40]);
    let mixed: Vec<(&str, Vec<u8>)> = vec![
        (
            "leading noise with a spurious marker",
            vec![0x00, 0x11, 0x5A, 0x5A, 0x03, 0x01],
        ),
        ("synthesize frame, two populated slots", synthesize.clone()),
        ("heartbeat frame (opaque kind)", heartbeat),
        ("wave frame, four samples per group", wave_frame(4)),
        ("wave frame with an ambiguous declared length", ambiguous),
        ("truncated synthesize frame", vec![0x5A, 0x5A, 0x11, 0x9C, 0x00]),
    ];

    write_hex(
        &root.join("synthesize").join("input.hex"),
        &[("synthesize frame, two populated slots", synthesize)],
    )?;
    write_hex(
        &root.join("wave").join("input.hex"),
        &[("wave frame, two samples per group", wave_frame(2))],
    )?;
    write_hex(&root.join("mixed").join("input.hex"), &mixed)?;

    let raw: Vec<u8> = mixed.iter().flat_map(|(_, bytes)| bytes.clone()).collect();
    write_file(&root.join("mixed_raw").join("input.bin"), &raw)?;
    Ok(())
}

struct Slot {
    out_voltage: u16,
    out_current: u16,
    in_voltage: u16,
    in_current: u16,
    set_voltage: u16,
    set_current: u16,
    temperature: u16,
    machine_type: u8,
    locked: bool,
    status: u8,
    color: [u8; 3],
    error_code: u8,
}

impl Slot {
    fn write(&self, number: u8, out: &mut Vec<u8>) {
        out.push(number);
        for raw in [
            self.out_voltage,
            self.out_current,
            self.in_voltage,
            self.in_current,
            self.set_voltage,
            self.set_current,
            self.temperature,
        ] {
            out.extend_from_slice(&raw.to_le_bytes());
        }
        out.extend_from_slice(&[1, self.machine_type, self.locked as u8, self.status, 1]);
        out.extend_from_slice(&self.color);
        out.extend_from_slice(&[self.error_code, 0]);
    }
}

fn synthesize_frame() -> Vec<u8> {
    let slots = [
        Slot {
            out_voltage: 5000,
            out_current: 1000,
            in_voltage: 12000,
            in_current: 500,
            set_voltage: 5000,
            set_current: 1500,
            temperature: 250,
            machine_type: MACHINE_P906,
            locked: false,
            status: 2,
            color: [0x1F, 0xF8, 0x00],
            error_code: 0,
        },
        Slot {
            out_voltage: 3300,
            out_current: 2000,
            in_voltage: 24000,
            in_current: 300,
            set_voltage: 3300,
            set_current: 2500,
            temperature: 312,
            machine_type: MACHINE_L1060,
            locked: true,
            status: 2,
            color: [0xE0, 0x07, 0x00],
            error_code: 1,
        },
    ];

    let mut body = Vec::new();
    for number in 0..SYNTHESIZE_SLOTS {
        match slots.get(number as usize) {
            Some(slot) => slot.write(number, &mut body),
            None => {
                body.push(number);
                body.extend_from_slice(&[0u8; SLOT_LEN - 1]);
            }
        }
    }
    frame(KIND_SYNTHESIZE, &with_checksum(body))
}

fn wave_frame(group_size: u16) -> Vec<u8> {
    let mut body = Vec::new();
    for group in 0..WAVE_GROUPS {
        body.extend_from_slice(&(1000 + group * 40).to_le_bytes());
        let group = group as u16;
        for item in 0..group_size {
            body.extend_from_slice(&(5000 + group * 10 + item).to_le_bytes());
            body.extend_from_slice(&(1000 + group * 5 + item).to_le_bytes());
        }
    }
    frame(KIND_WAVE, &with_checksum(body))
}

fn with_checksum(body: Vec<u8>) -> Vec<u8> {
    let checksum = body.iter().fold(0u8, |acc, byte| acc ^ byte);
    let mut payload = vec![ACTIVE_CHANNEL, checksum];
    payload.extend_from_slice(&body);
    payload
}

fn frame(kind: u8, payload: &[u8]) -> Vec<u8> {
    let mut out = MAGIC.to_vec();
    out.push(kind);
    out.push((HEADER_LEN + payload.len()) as u8);
    out.extend_from_slice(payload);
    out
}

fn write_hex(path: &Path, parts: &[(&str, Vec<u8>)]) -> Result<(), String> {
    let mut text = String::new();
    for (comment, bytes) in parts {
        text.push_str("# ");
        text.push_str(comment);
        text.push('\n');
        text.push_str(&hex::encode_upper(bytes));
        text.push('\n');
    }
    write_file(path, text.as_bytes())
}

fn write_file(path: &Path, bytes: &[u8]) -> Result<(), String> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .map_err(|err| format!("failed to create {}: {}", parent.display(), err))?;
    }
    fs::write(path, bytes).map_err(|err| format!("failed to write {}: {}", path.display(), err))
}
