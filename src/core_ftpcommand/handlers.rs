use crate::core_ftpcommand::ftpcommand::FtpCommand;
use crate::core_network::server::ServerShared;
use crate::core_network::session::{ControlWriter, Session};
use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use tokio::sync::Mutex as TokioMutex;

pub type HandlerFuture = Pin<Box<dyn Future<Output = Result<(), std::io::Error>> + Send>>;

pub type CommandHandler = Box<
    dyn Fn(
            ControlWriter,
            Arc<ServerShared>,
            Arc<TokioMutex<Session>>,
            String, // Parameter string after the command word
        ) -> HandlerFuture
        + Send
        + Sync,
>;

macro_rules! handler {
    ($module:ident :: $func:ident) => {
        Arc::new(Box::new(|writer, shared, session, arg| {
            Box::pin(crate::core_ftpcommand::$module::$func(
                writer, shared, session, arg,
            ))
        }))
    };
}

pub fn initialize_command_handlers() -> HashMap<FtpCommand, Arc<CommandHandler>> {
    let mut handlers: HashMap<FtpCommand, Arc<CommandHandler>> = HashMap::new();

    handlers.insert(FtpCommand::USER, handler!(user::handle_user_command));
    handlers.insert(FtpCommand::PASS, handler!(pass::handle_pass_command));
    handlers.insert(FtpCommand::CWD, handler!(cwd::handle_cwd_command));
    handlers.insert(FtpCommand::PWD, handler!(pwd::handle_pwd_command));
    handlers.insert(FtpCommand::CDUP, handler!(cdup::handle_cdup_command));
    handlers.insert(FtpCommand::REIN, handler!(rein::handle_rein_command));
    handlers.insert(FtpCommand::QUIT, handler!(quit::handle_quit_command));

    handlers.insert(FtpCommand::PORT, handler!(port::handle_port_command));
    handlers.insert(FtpCommand::PASV, handler!(pasv::handle_pasv_command));
    handlers.insert(FtpCommand::TYPE, handler!(type_::handle_type_command));
    handlers.insert(FtpCommand::STRU, handler!(stru::handle_stru_command));
    handlers.insert(FtpCommand::MODE, handler!(mode::handle_mode_command));

    handlers.insert(FtpCommand::ABOR, handler!(abor::handle_abor_command));
    handlers.insert(FtpCommand::RETR, handler!(retr::handle_retr_command));
    handlers.insert(FtpCommand::STOR, handler!(stor::handle_stor_command));
    handlers.insert(FtpCommand::APPE, handler!(appe::handle_appe_command));
    handlers.insert(FtpCommand::DELE, handler!(dele::handle_dele_command));
    handlers.insert(FtpCommand::RMD, handler!(rmd::handle_rmd_command));
    handlers.insert(FtpCommand::MKD, handler!(mkd::handle_mkd_command));

    handlers.insert(FtpCommand::SIZE, handler!(size::handle_size_command));
    handlers.insert(FtpCommand::MDTM, handler!(mdtm::handle_mdtm_command));
    handlers.insert(FtpCommand::MLST, handler!(mlst::handle_mlst_command));
    handlers.insert(FtpCommand::MLSD, handler!(mlsd::handle_mlsd_command));
    handlers.insert(FtpCommand::LIST, handler!(list::handle_list_command));

    handlers.insert(FtpCommand::FEAT, handler!(feat::handle_feat_command));
    handlers.insert(FtpCommand::SYST, handler!(syst::handle_syst_command));
    handlers.insert(FtpCommand::ALLO, handler!(allo::handle_allo_command));
    handlers.insert(FtpCommand::NOOP, handler!(noop::handle_noop_command));

    for cmd in [
        FtpCommand::ACCT,
        FtpCommand::STOU,
        FtpCommand::REST,
        FtpCommand::NLST,
        FtpCommand::SITE,
        FtpCommand::STAT,
    ] {
        handlers.insert(cmd, handler!(unimplemented::handle_unimplemented_command));
    }

    handlers
}
