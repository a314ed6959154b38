//! Import resolution for Strand: walks a parsed expression, fetches every
//! import it references, and substitutes the result in place, enforcing cycle,
//! origin/CORS, and integrity policy along the way.

mod cache;
mod canonical;
mod error;
mod fetch;
mod location;
mod origin;
mod resolver;

pub use cache::ImportCache;
pub use canonical::{CanonicalEncode, digest_of, hex};
pub use error::{Error, ErrorKind, FetchError};
pub use fetch::{
    AtomicCancellation, CancellationToken, EnvReader, FakeEnvReader, FakeFileReader,
    FakeHttpClient, FileReader, HttpClient, HttpResponse, NeverCancelled, OsEnvReader,
    OsFileReader, UreqHttpClient,
};
pub use origin::Origin;
pub use resolver::{ResolveOptions, resolve};
