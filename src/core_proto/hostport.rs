use std::net::{IpAddr, Ipv4Addr};

/// Parses the FTP host-port representation `h1,h2,h3,h4,p1,p2`
/// used by the PORT command. The port is `p1 << 8 | p2`.
pub fn parse_host_port(param: &str) -> Option<(Ipv4Addr, u16)> {
    let mut fields = [0u16; 6];
    let mut count = 0;
    for part in param.trim().split(',') {
        if count == 6 {
            return None;
        }
        fields[count] = part.trim().parse::<u8>().ok()? as u16;
        count += 1;
    }
    if count != 6 {
        return None;
    }
    let ip = Ipv4Addr::new(
        fields[0] as u8,
        fields[1] as u8,
        fields[2] as u8,
        fields[3] as u8,
    );
    let port = (fields[4] << 8) | fields[5];
    Some((ip, port))
}

/// Packs the FTP host-port representation for the PASV 227 reply.
/// Panics if `ip` is not an IPv4 address, which is a programming error
/// since passive listeners are bound over IPv4 only.
pub fn pack_host_port(ip: IpAddr, port: u16) -> String {
    let v4 = match ip {
        IpAddr::V4(v4) => v4,
        IpAddr::V6(v6) => match v6.to_ipv4_mapped() {
            Some(v4) => v4,
            None => panic!("pack_host_port: IP not IPv4: {}", ip),
        },
    };
    let o = v4.octets();
    format!(
        "{},{},{},{},{},{}",
        o[0],
        o[1],
        o[2],
        o[3],
        (port & 0xff00) >> 8,
        port & 0xff
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_valid() {
        let (ip, port) = parse_host_port("127,0,0,1,248,213").unwrap();
        assert_eq!(ip, Ipv4Addr::new(127, 0, 0, 1));
        assert_eq!(port, 248 * 256 + 213);
    }

    #[test]
    fn parse_rejects_garbage() {
        assert!(parse_host_port("").is_none());
        assert!(parse_host_port("1,2,3,4,5").is_none());
        assert!(parse_host_port("1,2,3,4,5,6,7").is_none());
        assert!(parse_host_port("256,0,0,1,0,21").is_none());
        assert!(parse_host_port("a,b,c,d,e,f").is_none());
    }

    #[test]
    fn round_trip() {
        let cases = [
            (Ipv4Addr::new(0, 0, 0, 0), 0u16),
            (Ipv4Addr::new(127, 0, 0, 1), 21),
            (Ipv4Addr::new(10, 42, 0, 255), 63700),
            (Ipv4Addr::new(255, 255, 255, 255), 65535),
        ];
        for (ip, port) in cases {
            let packed = pack_host_port(IpAddr::V4(ip), port);
            assert_eq!(parse_host_port(&packed), Some((ip, port)));
        }
    }

    #[test]
    #[should_panic]
    fn pack_rejects_ipv6() {
        pack_host_port("2001:db8::1".parse().unwrap(), 21);
    }
}
