use may::coroutine::JoinHandle;
use may_minihttp::{HttpServer, HttpService, Request, Response};
use std::io;
use std::net::{SocketAddr, TcpStream, ToSocketAddrs};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use tracing::info;

use super::request::read_request;
use super::response::{write_json_error, write_response};
use crate::dispatcher::HandlerResponse;
use crate::router::Router;

/// The `may_minihttp` service wrapping a finished [`Router`].
///
/// Clone-per-connection, as the runtime requires; every clone shares the
/// same immutable routing table.
#[derive(Clone)]
pub struct RouterService {
    router: Arc<Router>,
}

impl RouterService {
    pub fn new(router: Arc<Router>) -> Self {
        RouterService { router }
    }

    pub fn router(&self) -> &Arc<Router> {
        &self.router
    }

    /// Bind `addr` and serve this router on a `may` coroutine.
    ///
    /// # Errors
    ///
    /// Fails when the address does not resolve or the port cannot be bound.
    pub fn start<A: ToSocketAddrs>(self, addr: A) -> io::Result<ServerHandle> {
        let addr = addr
            .to_socket_addrs()?
            .next()
            .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "invalid address"))?;
        let serving = HttpServer(self).start(addr)?;
        info!(%addr, "router serving");
        Ok(ServerHandle { addr, serving })
    }
}

impl HttpService for RouterService {
    fn call(&mut self, req: Request, res: &mut Response) -> io::Result<()> {
        let mut request = match read_request(req) {
            Ok(request) => request,
            Err(_) => {
                write_json_error(res, 400, serde_json::json!({ "error": "invalid method" }));
                return Ok(());
            }
        };

        let mut response = HandlerResponse::default();
        self.router.serve(&mut request, &mut response);
        write_response(res, response);
        Ok(())
    }
}

/// A router being served on a coroutine, as returned by
/// [`RouterService::start`].
pub struct ServerHandle {
    addr: SocketAddr,
    serving: JoinHandle<()>,
}

impl ServerHandle {
    /// The address the router was bound to.
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Block until the listener accepts connections, so callers can fire
    /// requests right after startup.
    ///
    /// # Errors
    ///
    /// Returns the last connect error when the listener is still not
    /// accepting after a couple of seconds.
    pub fn wait_ready(&self) -> io::Result<()> {
        let deadline = Instant::now() + Duration::from_secs(2);
        loop {
            match TcpStream::connect(self.addr) {
                Ok(_) => return Ok(()),
                Err(err) if Instant::now() >= deadline => return Err(err),
                Err(_) => thread::sleep(Duration::from_millis(20)),
            }
        }
    }

    /// Cancel the serving coroutine and wait for it to wind down.
    pub fn stop(self) {
        unsafe { self.serving.coroutine().cancel() };
        let _ = self.serving.join();
    }

    /// Block until the serving coroutine exits on its own.
    pub fn join(self) -> thread::Result<()> {
        self.serving.join()
    }
}
