use crate::core_auth::AccessLevel;

#[derive(Eq, Hash, PartialEq, Debug, Clone, Copy)]
pub enum FtpCommand {
    // Access control
    USER,
    PASS,
    CWD,
    PWD,
    CDUP,
    REIN,
    QUIT,
    // Transfer parameters
    PORT,
    PASV,
    TYPE,
    STRU,
    MODE,
    // Service
    ABOR,
    RETR,
    STOR,
    APPE,
    DELE,
    RMD,
    MKD,
    // RFC 3659 extensions
    SIZE,
    MDTM,
    MLST,
    MLSD,
    // Other
    LIST,
    FEAT,
    SYST,
    ALLO,
    NOOP,
    // Recognized but not implemented (502)
    ACCT,
    STOU,
    REST,
    NLST,
    SITE,
    STAT,
}

impl FtpCommand {
    pub fn from_name(cmd: &str) -> Option<FtpCommand> {
        match cmd.to_ascii_uppercase().as_str() {
            "USER" => Some(FtpCommand::USER),
            "PASS" => Some(FtpCommand::PASS),
            "CWD" => Some(FtpCommand::CWD),
            "PWD" => Some(FtpCommand::PWD),
            "CDUP" => Some(FtpCommand::CDUP),
            "REIN" => Some(FtpCommand::REIN),
            "QUIT" => Some(FtpCommand::QUIT),
            "PORT" => Some(FtpCommand::PORT),
            "PASV" => Some(FtpCommand::PASV),
            "TYPE" => Some(FtpCommand::TYPE),
            "STRU" => Some(FtpCommand::STRU),
            "MODE" => Some(FtpCommand::MODE),
            "ABOR" => Some(FtpCommand::ABOR),
            "RETR" => Some(FtpCommand::RETR),
            "STOR" => Some(FtpCommand::STOR),
            "APPE" => Some(FtpCommand::APPE),
            "DELE" => Some(FtpCommand::DELE),
            "RMD" => Some(FtpCommand::RMD),
            "MKD" => Some(FtpCommand::MKD),
            "SIZE" => Some(FtpCommand::SIZE),
            "MDTM" => Some(FtpCommand::MDTM),
            "MLST" => Some(FtpCommand::MLST),
            "MLSD" => Some(FtpCommand::MLSD),
            "LIST" => Some(FtpCommand::LIST),
            "FEAT" => Some(FtpCommand::FEAT),
            "SYST" => Some(FtpCommand::SYST),
            "ALLO" => Some(FtpCommand::ALLO),
            "NOOP" => Some(FtpCommand::NOOP),
            "ACCT" => Some(FtpCommand::ACCT),
            "STOU" => Some(FtpCommand::STOU),
            "REST" => Some(FtpCommand::REST),
            "NLST" => Some(FtpCommand::NLST),
            "SITE" => Some(FtpCommand::SITE),
            "STAT" => Some(FtpCommand::STAT),
            _ => None,
        }
    }

    /// The minimum access level the session must hold before the
    /// command's handler runs; the dispatcher answers 530 otherwise.
    pub fn required_access(self) -> AccessLevel {
        use FtpCommand::*;
        match self {
            STOR | APPE | DELE | RMD | MKD => AccessLevel::ReadWrite,
            CWD | PWD | CDUP | PORT | PASV | TYPE | STRU | MODE | ABOR | RETR | SIZE | MDTM
            | MLST | MLSD | LIST => AccessLevel::ReadOnly,
            USER | PASS | REIN | QUIT | FEAT | SYST | ALLO | NOOP | ACCT | STOU | REST | NLST
            | SITE | STAT => AccessLevel::None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn case_insensitive_lookup() {
        assert_eq!(FtpCommand::from_name("retr"), Some(FtpCommand::RETR));
        assert_eq!(FtpCommand::from_name("Pasv"), Some(FtpCommand::PASV));
        assert_eq!(FtpCommand::from_name("XYZQ"), None);
    }

    #[test]
    fn write_commands_require_read_write() {
        for cmd in [
            FtpCommand::STOR,
            FtpCommand::APPE,
            FtpCommand::DELE,
            FtpCommand::RMD,
            FtpCommand::MKD,
        ] {
            assert_eq!(cmd.required_access(), AccessLevel::ReadWrite);
        }
        assert_eq!(FtpCommand::RETR.required_access(), AccessLevel::ReadOnly);
        assert_eq!(FtpCommand::USER.required_access(), AccessLevel::None);
    }
}
