/*!
Subcommand dispatch.

  src/cmd/
    mod.rs      (this file)
    serve.rs    (ServeArgs + execute_serve; the default command)
    list.rs     (ListArgs  + execute_list)
    call.rs     (CallArgs  + execute_call)
    shared.rs   (target resolution, tool fetch, param coercion)

Each subcommand module exposes one `execute_*` function returning
`anyhow::Result<()>`.
*/

pub mod call;
pub mod list;
pub mod serve;
pub mod shared;

pub use call::{CallArgs, execute_call};
pub use list::{ListArgs, execute_list};
pub use serve::{ServeArgs, execute_serve};
