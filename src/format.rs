//! Display helpers: binary-prefix sizes and canonical hexdumps

/// Render a byte count with binary prefixes. Thresholds sit at twice each
/// unit so small multiples stay in the finer unit.
#[must_use]
pub fn unitize(x: u64) -> String {
    const KIB: u64 = 1024;
    const MIB: u64 = KIB * 1024;
    const GIB: u64 = MIB * 1024;
    const TIB: u64 = GIB * 1024;
    match x {
        x if x < 2 * KIB => format!("{x} B"),
        x if x < 2 * MIB => format!("{:.0} kiB", x as f64 / KIB as f64),
        x if x < 2 * GIB => format!("{:.2} MiB", x as f64 / MIB as f64),
        x if x < 2 * TIB => format!("{:.2} GiB", x as f64 / GIB as f64),
        x => format!("{:.2} TiB", x as f64 / TIB as f64),
    }
}

/// Canonical hexdump: 16 bytes per line, hex in two groups of eight, then
/// the printable-ASCII gutter.
#[must_use]
pub fn hexdump(data: &[u8]) -> String {
    let mut out = String::new();
    for (line, chunk) in data.chunks(16).enumerate() {
        out.push_str(&format!("{:08x}  ", line * 16));
        for i in 0..16 {
            if i == 8 {
                out.push(' ');
            }
            match chunk.get(i) {
                Some(byte) => out.push_str(&format!("{byte:02x} ")),
                None => out.push_str("   "),
            }
        }
        out.push_str(" |");
        for &byte in chunk {
            out.push(if (0x20..0x7f).contains(&byte) { byte as char } else { '.' });
        }
        out.push_str("|\n");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unitize_thresholds() {
        assert_eq!(unitize(0), "0 B");
        assert_eq!(unitize(2047), "2047 B");
        assert_eq!(unitize(2048), "2 kiB");
        assert_eq!(unitize(1024 * 1024), "1024 kiB");
        assert_eq!(unitize(2 * 1024 * 1024), "2.00 MiB");
        assert_eq!(unitize(3 * 1024 * 1024 + 512 * 1024), "3.50 MiB");
        assert_eq!(unitize(2 * 1024 * 1024 * 1024), "2.00 GiB");
        assert_eq!(unitize(3 * 1024 * 1024 * 1024 * 1024), "3.00 TiB");
    }

    #[test]
    fn test_hexdump_full_line() {
        let data: Vec<u8> = (b'a'..=b'p').collect();
        assert_eq!(
            hexdump(&data),
            "00000000  61 62 63 64 65 66 67 68  69 6a 6b 6c 6d 6e 6f 70  |abcdefghijklmnop|\n"
        );
    }

    #[test]
    fn test_hexdump_partial_line_pads_gutter() {
        assert_eq!(
            hexdump(b"test"),
            "00000000  74 65 73 74                                       |test|\n"
        );
    }

    #[test]
    fn test_hexdump_nonprintable_and_multiline() {
        let mut data = vec![0u8; 16];
        data.extend_from_slice(b"Hi");
        let dump = hexdump(&data);
        let mut lines = dump.lines();
        assert_eq!(
            lines.next().unwrap(),
            "00000000  00 00 00 00 00 00 00 00  00 00 00 00 00 00 00 00  |................|"
        );
        assert_eq!(
            lines.next().unwrap(),
            "00000010  48 69                                             |Hi|"
        );
        assert!(lines.next().is_none());
    }

    #[test]
    fn test_hexdump_empty_is_empty() {
        assert_eq!(hexdump(&[]), "");
    }
}
