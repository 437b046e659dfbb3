//! 端口绑定（带一次备用端口重试）

use std::net::{SocketAddr, ToSocketAddrs, UdpSocket};

use tracing::{info, warn};

use crate::error::{Error, Result};

/// 绑定 `host:port`；失败时仅重试一次 `port + 1`，再失败即为启动错误
pub fn bind_with_fallback(host: &str, port: u16) -> Result<UdpSocket> {
    let addr = (host, port)
        .to_socket_addrs()?
        .next()
        .ok_or_else(|| Error::Config(format!("host `{host}` resolved to no address")))?;

    let first_err = match UdpSocket::bind(addr) {
        Ok(socket) => {
            info!(%addr, "🔊 UDP 监听端口绑定成功");
            return Ok(socket);
        }
        Err(e) => e,
    };

    let Some(alt_port) = port.checked_add(1) else {
        return Err(Error::Bind {
            addr,
            fallback: addr,
            source: first_err,
        });
    };
    let fallback = SocketAddr::new(addr.ip(), alt_port);
    warn!(%addr, error = %first_err, "⚠️  端口被占用，尝试备用端口");

    match UdpSocket::bind(fallback) {
        Ok(socket) => {
            warn!(%fallback, "已改用备用端口");
            Ok(socket)
        }
        Err(source) => Err(Error::Bind {
            addr,
            fallback,
            source,
        }),
    }
}
