//! Purpose: Model the C parser's SAX callback table.
//! Exports: `SaxHandler` plus the callback signature aliases.
//! Role: The externally mandated structure shape this crate installs its
//! dispatch shims into. The crate never owns an instance; it only mutates
//! the `error` and `warning` fields during registration.
//! Invariants: Field order and signatures track the C table; registration
//! must leave every other field untouched.

use std::os::raw::{c_char, c_int, c_uchar, c_uint, c_void};

use crate::format::MessageArg;

pub type InternalSubsetSaxFunc = unsafe extern "C" fn(
    ctx: *mut c_void,
    name: *const c_uchar,
    external_id: *const c_uchar,
    system_id: *const c_uchar,
);
pub type IsStandaloneSaxFunc = unsafe extern "C" fn(ctx: *mut c_void) -> c_int;
pub type HasInternalSubsetSaxFunc = unsafe extern "C" fn(ctx: *mut c_void) -> c_int;
pub type HasExternalSubsetSaxFunc = unsafe extern "C" fn(ctx: *mut c_void) -> c_int;
pub type ResolveEntitySaxFunc = unsafe extern "C" fn(
    ctx: *mut c_void,
    public_id: *const c_uchar,
    system_id: *const c_uchar,
) -> *mut c_void;
pub type GetEntitySaxFunc =
    unsafe extern "C" fn(ctx: *mut c_void, name: *const c_uchar) -> *mut c_void;
pub type EntityDeclSaxFunc = unsafe extern "C" fn(
    ctx: *mut c_void,
    name: *const c_uchar,
    kind: c_int,
    public_id: *const c_uchar,
    system_id: *const c_uchar,
    content: *mut c_uchar,
);
pub type NotationDeclSaxFunc = unsafe extern "C" fn(
    ctx: *mut c_void,
    name: *const c_uchar,
    public_id: *const c_uchar,
    system_id: *const c_uchar,
);
pub type AttributeDeclSaxFunc = unsafe extern "C" fn(
    ctx: *mut c_void,
    elem: *const c_uchar,
    fullname: *const c_uchar,
    kind: c_int,
    default_kind: c_int,
    default_value: *const c_uchar,
    tree: *mut c_void,
);
pub type ElementDeclSaxFunc = unsafe extern "C" fn(
    ctx: *mut c_void,
    name: *const c_uchar,
    kind: c_int,
    content: *mut c_void,
);
pub type UnparsedEntityDeclSaxFunc = unsafe extern "C" fn(
    ctx: *mut c_void,
    name: *const c_uchar,
    public_id: *const c_uchar,
    system_id: *const c_uchar,
    notation_name: *const c_uchar,
);
pub type SetDocumentLocatorSaxFunc = unsafe extern "C" fn(ctx: *mut c_void, locator: *mut c_void);
pub type StartDocumentSaxFunc = unsafe extern "C" fn(ctx: *mut c_void);
pub type EndDocumentSaxFunc = unsafe extern "C" fn(ctx: *mut c_void);
pub type StartElementSaxFunc = unsafe extern "C" fn(
    ctx: *mut c_void,
    name: *const c_uchar,
    attributes: *mut *const c_uchar,
);
pub type EndElementSaxFunc = unsafe extern "C" fn(ctx: *mut c_void, name: *const c_uchar);
pub type ReferenceSaxFunc = unsafe extern "C" fn(ctx: *mut c_void, name: *const c_uchar);
pub type CharactersSaxFunc =
    unsafe extern "C" fn(ctx: *mut c_void, text: *const c_uchar, len: c_int);
pub type IgnorableWhitespaceSaxFunc =
    unsafe extern "C" fn(ctx: *mut c_void, text: *const c_uchar, len: c_int);
pub type ProcessingInstructionSaxFunc = unsafe extern "C" fn(
    ctx: *mut c_void,
    target: *const c_uchar,
    data: *const c_uchar,
);
pub type CommentSaxFunc = unsafe extern "C" fn(ctx: *mut c_void, value: *const c_uchar);
pub type GetParameterEntitySaxFunc =
    unsafe extern "C" fn(ctx: *mut c_void, name: *const c_uchar) -> *mut c_void;
pub type CdataBlockSaxFunc =
    unsafe extern "C" fn(ctx: *mut c_void, value: *const c_uchar, len: c_int);
pub type ExternalSubsetSaxFunc = unsafe extern "C" fn(
    ctx: *mut c_void,
    name: *const c_uchar,
    external_id: *const c_uchar,
    system_id: *const c_uchar,
);

/// Diagnostic callback: a template plus its marshalled variadic arguments.
/// The fixed-arity equivalent of the parser's `(ctx, msg, ...)` signature.
pub type DiagnosticSaxFunc = for<'a> unsafe extern "C" fn(
    ctx: *mut c_void,
    msg: *const c_char,
    args: *const MessageArg<'a>,
    len: usize,
);

/// The parser's SAX callback table. All fields are optional; an empty
/// table suppresses every event.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default)]
pub struct SaxHandler {
    pub internal_subset: Option<InternalSubsetSaxFunc>,
    pub is_standalone: Option<IsStandaloneSaxFunc>,
    pub has_internal_subset: Option<HasInternalSubsetSaxFunc>,
    pub has_external_subset: Option<HasExternalSubsetSaxFunc>,
    pub resolve_entity: Option<ResolveEntitySaxFunc>,
    pub get_entity: Option<GetEntitySaxFunc>,
    pub entity_decl: Option<EntityDeclSaxFunc>,
    pub notation_decl: Option<NotationDeclSaxFunc>,
    pub attribute_decl: Option<AttributeDeclSaxFunc>,
    pub element_decl: Option<ElementDeclSaxFunc>,
    pub unparsed_entity_decl: Option<UnparsedEntityDeclSaxFunc>,
    pub set_document_locator: Option<SetDocumentLocatorSaxFunc>,
    pub start_document: Option<StartDocumentSaxFunc>,
    pub end_document: Option<EndDocumentSaxFunc>,
    pub start_element: Option<StartElementSaxFunc>,
    pub end_element: Option<EndElementSaxFunc>,
    pub reference: Option<ReferenceSaxFunc>,
    pub characters: Option<CharactersSaxFunc>,
    pub ignorable_whitespace: Option<IgnorableWhitespaceSaxFunc>,
    pub processing_instruction: Option<ProcessingInstructionSaxFunc>,
    pub comment: Option<CommentSaxFunc>,
    pub warning: Option<DiagnosticSaxFunc>,
    pub error: Option<DiagnosticSaxFunc>,
    pub fatal_error: Option<DiagnosticSaxFunc>,
    pub get_parameter_entity: Option<GetParameterEntitySaxFunc>,
    pub cdata_block: Option<CdataBlockSaxFunc>,
    pub external_subset: Option<ExternalSubsetSaxFunc>,
    pub initialized: c_uint,
}
