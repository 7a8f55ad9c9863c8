//! Diagnostic kinds, suppression codes and the diagnostics sink.
//!
//! The external compiler reports every issue it finds with a `JSC_*` key. This module knows
//! which keys exist, which group each key belongs to, and how a suppression code written by a
//! user (either in a library descriptor or with `--suppress`) maps onto a set of kinds.
//!
//! All diagnostics emitted during a run flow through a [`DiagnosticsContext`], which consults
//! the [`DiagnosticPolicy`] and only keeps what is not suppressed.
//!
//! # Example
//!
//! ```rust
//! use closure_runner::diagnostics::{DiagnosticKind, kinds_for_suppress_code};
//!
//! assert_eq!(DiagnosticKind::from_key("JSC_TYPE_MISMATCH"), Some(DiagnosticKind::TypeMismatch));
//! assert!(kinds_for_suppress_code("checkTypes").is_some());
//! ```

use std::fmt;
use std::path::PathBuf;

use crate::helpers;
use crate::policy::DiagnosticPolicy;
use crate::render;

/// Diagnostic kinds known to the runner.
///
/// Each kind maps to the `JSC_*` key the compiler prints and to exactly one group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[allow(missing_docs)]
pub enum DiagnosticKind {
    // checkTypes
    TypeMismatch,
    WrongArgumentCount,
    NotAConstructor,
    NotCallable,
    ConstructorNotCallable,
    IllegalPrototypeMember,
    InexistentEnumElement,
    InterfaceMethodNotImplemented,
    TypeParseError,
    BadTypeForBitOperation,
    IllegalPropertyCreation,
    // missingProperties
    InexistentProperty,
    PossibleInexistentProperty,
    // reportUnknownTypes
    UnknownExprType,
    // invalidCasts
    InvalidCast,
    // visibility
    BadPrivatePropertyAccess,
    BadProtectedPropertyAccess,
    BadPackagePropertyAccess,
    BadPrivateGlobalAccess,
    PrivateOverride,
    VisibilityMismatch,
    // deprecated
    DeprecatedProp,
    DeprecatedClass,
    DeprecatedName,
    // missingRequire
    MissingRequireWarning,
    // strictMissingRequire
    MissingRequireStrictWarning,
    // extraRequire
    ExtraRequireWarning,
    DuplicateRequire,
    // missingProvide
    MissingProvideError,
    LateProvide,
    // checkVars
    UndefinedVariable,
    VarMultiplyDeclared,
    ReferenceBeforeDeclare,
    RedeclaredVariable,
    // const
    ConstantReassigned,
    MissingConstProperty,
    // constantProperty
    ConstantPropertyReassigned,
    ConstantPropertyDeleted,
    // uselessCode
    UselessCode,
    UnreachableCode,
    // suspiciousCode
    SuspiciousSemicolon,
    SuspiciousComparison,
    SuspiciousIn,
    // unusedLocalVariables
    UnusedLocalAssignment,
    // unusedPrivateMembers
    UnusedPrivateProperty,
    // missingReturn
    MissingReturnStatement,
    // missingOverride
    MissingOverride,
    // nonStandardJsDocs
    BadJsDocAnnotation,
    // misplacedTypeAnnotation
    MisplacedTypeAnnotation,
    // es5Strict
    UseOfWith,
    ArgumentsCalleeForbidden,
    EvalUse,
    // globalThis
    UsedGlobalThis,
    // checkRegExp
    MalformedRegexp,
    // externsValidation
    UndefinedExternVar,
    // lintChecks
    MissingJsDoc,
    MissingSemicolon,
    UseOfGoogBase,
    JsDocMissingType,
    // underscore
    MustBePrivate,
    // duplicateMessage
    DuplicateMessage,
}

impl DiagnosticKind {
    /// Every registered kind, in declaration order.
    pub const ALL: [DiagnosticKind; 61] = [
        DiagnosticKind::TypeMismatch,
        DiagnosticKind::WrongArgumentCount,
        DiagnosticKind::NotAConstructor,
        DiagnosticKind::NotCallable,
        DiagnosticKind::ConstructorNotCallable,
        DiagnosticKind::IllegalPrototypeMember,
        DiagnosticKind::InexistentEnumElement,
        DiagnosticKind::InterfaceMethodNotImplemented,
        DiagnosticKind::TypeParseError,
        DiagnosticKind::BadTypeForBitOperation,
        DiagnosticKind::IllegalPropertyCreation,
        DiagnosticKind::InexistentProperty,
        DiagnosticKind::PossibleInexistentProperty,
        DiagnosticKind::UnknownExprType,
        DiagnosticKind::InvalidCast,
        DiagnosticKind::BadPrivatePropertyAccess,
        DiagnosticKind::BadProtectedPropertyAccess,
        DiagnosticKind::BadPackagePropertyAccess,
        DiagnosticKind::BadPrivateGlobalAccess,
        DiagnosticKind::PrivateOverride,
        DiagnosticKind::VisibilityMismatch,
        DiagnosticKind::DeprecatedProp,
        DiagnosticKind::DeprecatedClass,
        DiagnosticKind::DeprecatedName,
        DiagnosticKind::MissingRequireWarning,
        DiagnosticKind::MissingRequireStrictWarning,
        DiagnosticKind::ExtraRequireWarning,
        DiagnosticKind::DuplicateRequire,
        DiagnosticKind::MissingProvideError,
        DiagnosticKind::LateProvide,
        DiagnosticKind::UndefinedVariable,
        DiagnosticKind::VarMultiplyDeclared,
        DiagnosticKind::ReferenceBeforeDeclare,
        DiagnosticKind::RedeclaredVariable,
        DiagnosticKind::ConstantReassigned,
        DiagnosticKind::MissingConstProperty,
        DiagnosticKind::ConstantPropertyReassigned,
        DiagnosticKind::ConstantPropertyDeleted,
        DiagnosticKind::UselessCode,
        DiagnosticKind::UnreachableCode,
        DiagnosticKind::SuspiciousSemicolon,
        DiagnosticKind::SuspiciousComparison,
        DiagnosticKind::SuspiciousIn,
        DiagnosticKind::UnusedLocalAssignment,
        DiagnosticKind::UnusedPrivateProperty,
        DiagnosticKind::MissingReturnStatement,
        DiagnosticKind::MissingOverride,
        DiagnosticKind::BadJsDocAnnotation,
        DiagnosticKind::MisplacedTypeAnnotation,
        DiagnosticKind::UseOfWith,
        DiagnosticKind::ArgumentsCalleeForbidden,
        DiagnosticKind::EvalUse,
        DiagnosticKind::UsedGlobalThis,
        DiagnosticKind::MalformedRegexp,
        DiagnosticKind::UndefinedExternVar,
        DiagnosticKind::MissingJsDoc,
        DiagnosticKind::MissingSemicolon,
        DiagnosticKind::UseOfGoogBase,
        DiagnosticKind::JsDocMissingType,
        DiagnosticKind::MustBePrivate,
        DiagnosticKind::DuplicateMessage,
    ];

    /// The key printed by the compiler, e.g. `JSC_TYPE_MISMATCH`.
    pub fn key(self) -> &'static str {
        match self {
            DiagnosticKind::TypeMismatch => "JSC_TYPE_MISMATCH",
            DiagnosticKind::WrongArgumentCount => "JSC_WRONG_ARGUMENT_COUNT",
            DiagnosticKind::NotAConstructor => "JSC_NOT_A_CONSTRUCTOR",
            DiagnosticKind::NotCallable => "JSC_NOT_CALLABLE",
            DiagnosticKind::ConstructorNotCallable => "JSC_CONSTRUCTOR_NOT_CALLABLE",
            DiagnosticKind::IllegalPrototypeMember => "JSC_ILLEGAL_PROTOTYPE_MEMBER",
            DiagnosticKind::InexistentEnumElement => "JSC_INEXISTENT_ENUM_ELEMENT",
            DiagnosticKind::InterfaceMethodNotImplemented => "JSC_INTERFACE_METHOD_NOT_IMPLEMENTED",
            DiagnosticKind::TypeParseError => "JSC_TYPE_PARSE_ERROR",
            DiagnosticKind::BadTypeForBitOperation => "JSC_BAD_TYPE_FOR_BIT_OPERATION",
            DiagnosticKind::IllegalPropertyCreation => "JSC_ILLEGAL_PROPERTY_CREATION",
            DiagnosticKind::InexistentProperty => "JSC_INEXISTENT_PROPERTY",
            DiagnosticKind::PossibleInexistentProperty => "JSC_POSSIBLE_INEXISTENT_PROPERTY",
            DiagnosticKind::UnknownExprType => "JSC_UNKNOWN_EXPR_TYPE",
            DiagnosticKind::InvalidCast => "JSC_INVALID_CAST",
            DiagnosticKind::BadPrivatePropertyAccess => "JSC_BAD_PRIVATE_PROPERTY_ACCESS",
            DiagnosticKind::BadProtectedPropertyAccess => "JSC_BAD_PROTECTED_PROPERTY_ACCESS",
            DiagnosticKind::BadPackagePropertyAccess => "JSC_BAD_PACKAGE_PROPERTY_ACCESS",
            DiagnosticKind::BadPrivateGlobalAccess => "JSC_BAD_PRIVATE_GLOBAL_ACCESS",
            DiagnosticKind::PrivateOverride => "JSC_PRIVATE_OVERRIDE",
            DiagnosticKind::VisibilityMismatch => "JSC_VISIBILITY_MISMATCH",
            DiagnosticKind::DeprecatedProp => "JSC_DEPRECATED_PROP",
            DiagnosticKind::DeprecatedClass => "JSC_DEPRECATED_CLASS",
            DiagnosticKind::DeprecatedName => "JSC_DEPRECATED_NAME",
            DiagnosticKind::MissingRequireWarning => "JSC_MISSING_REQUIRE_WARNING",
            DiagnosticKind::MissingRequireStrictWarning => "JSC_MISSING_REQUIRE_STRICT_WARNING",
            DiagnosticKind::ExtraRequireWarning => "JSC_EXTRA_REQUIRE_WARNING",
            DiagnosticKind::DuplicateRequire => "JSC_DUPLICATE_REQUIRE",
            DiagnosticKind::MissingProvideError => "JSC_MISSING_PROVIDE_ERROR",
            DiagnosticKind::LateProvide => "JSC_LATE_PROVIDE",
            DiagnosticKind::UndefinedVariable => "JSC_UNDEFINED_VARIABLE",
            DiagnosticKind::VarMultiplyDeclared => "JSC_VAR_MULTIPLY_DECLARED_ERROR",
            DiagnosticKind::ReferenceBeforeDeclare => "JSC_REFERENCE_BEFORE_DECLARE",
            DiagnosticKind::RedeclaredVariable => "JSC_REDECLARED_VARIABLE",
            DiagnosticKind::ConstantReassigned => "JSC_CONSTANT_REASSIGNED_VALUE_ERROR",
            DiagnosticKind::MissingConstProperty => "JSC_MISSING_CONST_PROPERTY",
            DiagnosticKind::ConstantPropertyReassigned => "JSC_CONSTANT_PROPERTY_REASSIGNED_VALUE",
            DiagnosticKind::ConstantPropertyDeleted => "JSC_CONSTANT_PROPERTY_DELETED",
            DiagnosticKind::UselessCode => "JSC_USELESS_CODE",
            DiagnosticKind::UnreachableCode => "JSC_UNREACHABLE_CODE",
            DiagnosticKind::SuspiciousSemicolon => "JSC_SUSPICIOUS_SEMICOLON",
            DiagnosticKind::SuspiciousComparison => "JSC_SUSPICIOUS_COMPARISON_WITH_NAN",
            DiagnosticKind::SuspiciousIn => "JSC_SUSPICIOUS_IN",
            DiagnosticKind::UnusedLocalAssignment => "JSC_UNUSED_LOCAL_ASSIGNMENT",
            DiagnosticKind::UnusedPrivateProperty => "JSC_UNUSED_PRIVATE_PROPERTY",
            DiagnosticKind::MissingReturnStatement => "JSC_MISSING_RETURN_STATEMENT",
            DiagnosticKind::MissingOverride => "JSC_MISSING_OVERRIDE",
            DiagnosticKind::BadJsDocAnnotation => "JSC_BAD_JSDOC_ANNOTATION",
            DiagnosticKind::MisplacedTypeAnnotation => "JSC_MISPLACED_TYPE_ANNOTATION",
            DiagnosticKind::UseOfWith => "JSC_USE_OF_WITH",
            DiagnosticKind::ArgumentsCalleeForbidden => "JSC_ARGUMENTS_CALLEE_FORBIDDEN",
            DiagnosticKind::EvalUse => "JSC_EVAL_USE",
            DiagnosticKind::UsedGlobalThis => "JSC_USED_GLOBAL_THIS",
            DiagnosticKind::MalformedRegexp => "JSC_MALFORMED_REGEXP",
            DiagnosticKind::UndefinedExternVar => "JSC_UNDEFINED_EXTERN_VAR_ERROR",
            DiagnosticKind::MissingJsDoc => "JSC_MISSING_JSDOC",
            DiagnosticKind::MissingSemicolon => "JSC_MISSING_SEMICOLON",
            DiagnosticKind::UseOfGoogBase => "JSC_USE_OF_GOOG_BASE",
            DiagnosticKind::JsDocMissingType => "JSC_JSDOC_MISSING_TYPE_WARNING",
            DiagnosticKind::MustBePrivate => "JSC_MUST_BE_PRIVATE",
            DiagnosticKind::DuplicateMessage => "JSC_DUPLICATE_MESSAGE",
        }
    }

    /// The group this kind belongs to.
    pub fn group(self) -> DiagnosticGroup {
        match self {
            DiagnosticKind::TypeMismatch
            | DiagnosticKind::WrongArgumentCount
            | DiagnosticKind::NotAConstructor
            | DiagnosticKind::NotCallable
            | DiagnosticKind::ConstructorNotCallable
            | DiagnosticKind::IllegalPrototypeMember
            | DiagnosticKind::InexistentEnumElement
            | DiagnosticKind::InterfaceMethodNotImplemented
            | DiagnosticKind::TypeParseError
            | DiagnosticKind::BadTypeForBitOperation
            | DiagnosticKind::IllegalPropertyCreation
                => DiagnosticGroup::CheckTypes,
            DiagnosticKind::InexistentProperty
            | DiagnosticKind::PossibleInexistentProperty
                => DiagnosticGroup::MissingProperties,
            DiagnosticKind::UnknownExprType => DiagnosticGroup::ReportUnknownTypes,
            DiagnosticKind::InvalidCast => DiagnosticGroup::InvalidCasts,
            DiagnosticKind::BadPrivatePropertyAccess
            | DiagnosticKind::BadProtectedPropertyAccess
            | DiagnosticKind::BadPackagePropertyAccess
            | DiagnosticKind::BadPrivateGlobalAccess
            | DiagnosticKind::PrivateOverride
            | DiagnosticKind::VisibilityMismatch
                => DiagnosticGroup::Visibility,
            DiagnosticKind::DeprecatedProp
            | DiagnosticKind::DeprecatedClass
            | DiagnosticKind::DeprecatedName
                => DiagnosticGroup::Deprecated,
            DiagnosticKind::MissingRequireWarning => DiagnosticGroup::MissingRequire,
            DiagnosticKind::MissingRequireStrictWarning => DiagnosticGroup::StrictMissingRequire,
            DiagnosticKind::ExtraRequireWarning
            | DiagnosticKind::DuplicateRequire
                => DiagnosticGroup::ExtraRequire,
            DiagnosticKind::MissingProvideError
            | DiagnosticKind::LateProvide
                => DiagnosticGroup::MissingProvide,
            DiagnosticKind::UndefinedVariable
            | DiagnosticKind::VarMultiplyDeclared
            | DiagnosticKind::ReferenceBeforeDeclare
            | DiagnosticKind::RedeclaredVariable
                => DiagnosticGroup::CheckVars,
            DiagnosticKind::ConstantReassigned
            | DiagnosticKind::MissingConstProperty
                => DiagnosticGroup::Const,
            DiagnosticKind::ConstantPropertyReassigned
            | DiagnosticKind::ConstantPropertyDeleted
                => DiagnosticGroup::ConstantProperty,
            DiagnosticKind::UselessCode
            | DiagnosticKind::UnreachableCode
                => DiagnosticGroup::UselessCode,
            DiagnosticKind::SuspiciousSemicolon
            | DiagnosticKind::SuspiciousComparison
            | DiagnosticKind::SuspiciousIn
                => DiagnosticGroup::SuspiciousCode,
            DiagnosticKind::UnusedLocalAssignment => DiagnosticGroup::UnusedLocalVariables,
            DiagnosticKind::UnusedPrivateProperty => DiagnosticGroup::UnusedPrivateMembers,
            DiagnosticKind::MissingReturnStatement => DiagnosticGroup::MissingReturn,
            DiagnosticKind::MissingOverride => DiagnosticGroup::MissingOverride,
            DiagnosticKind::BadJsDocAnnotation => DiagnosticGroup::NonStandardJsDocs,
            DiagnosticKind::MisplacedTypeAnnotation => DiagnosticGroup::MisplacedTypeAnnotation,
            DiagnosticKind::UseOfWith
            | DiagnosticKind::ArgumentsCalleeForbidden
            | DiagnosticKind::EvalUse
                => DiagnosticGroup::Es5Strict,
            DiagnosticKind::UsedGlobalThis => DiagnosticGroup::GlobalThis,
            DiagnosticKind::MalformedRegexp => DiagnosticGroup::CheckRegExp,
            DiagnosticKind::UndefinedExternVar => DiagnosticGroup::ExternsValidation,
            DiagnosticKind::MissingJsDoc
            | DiagnosticKind::MissingSemicolon
            | DiagnosticKind::UseOfGoogBase
            | DiagnosticKind::JsDocMissingType
                => DiagnosticGroup::LintChecks,
            DiagnosticKind::MustBePrivate => DiagnosticGroup::Underscore,
            DiagnosticKind::DuplicateMessage => DiagnosticGroup::DuplicateMessage,
        }
    }

    /// Look up a kind by key.
    ///
    /// Accepts the full key (`JSC_TYPE_MISMATCH`) or the key without its `JSC_` prefix, in any
    /// case (`type_mismatch`).
    pub fn from_key(key: &str) -> Option<DiagnosticKind> {
        let normalized = key.trim().to_ascii_uppercase();
        let bare = normalized.strip_prefix("JSC_").unwrap_or(&normalized);
        DiagnosticKind::ALL
            .into_iter()
            .find(|kind| kind.key().strip_prefix("JSC_") == Some(bare))
    }
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.key())
    }
}

/// Named groups of diagnostic kinds, usable as suppression codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(missing_docs)]
pub enum DiagnosticGroup {
    CheckTypes,
    MissingProperties,
    ReportUnknownTypes,
    InvalidCasts,
    Visibility,
    Deprecated,
    MissingRequire,
    StrictMissingRequire,
    ExtraRequire,
    MissingProvide,
    CheckVars,
    Const,
    ConstantProperty,
    UselessCode,
    SuspiciousCode,
    UnusedLocalVariables,
    UnusedPrivateMembers,
    MissingReturn,
    MissingOverride,
    NonStandardJsDocs,
    MisplacedTypeAnnotation,
    Es5Strict,
    GlobalThis,
    CheckRegExp,
    ExternsValidation,
    LintChecks,
    Underscore,
    DuplicateMessage,
}

impl DiagnosticGroup {
    pub const ALL: [DiagnosticGroup; 28] = [
        DiagnosticGroup::CheckTypes,
        DiagnosticGroup::MissingProperties,
        DiagnosticGroup::ReportUnknownTypes,
        DiagnosticGroup::InvalidCasts,
        DiagnosticGroup::Visibility,
        DiagnosticGroup::Deprecated,
        DiagnosticGroup::MissingRequire,
        DiagnosticGroup::StrictMissingRequire,
        DiagnosticGroup::ExtraRequire,
        DiagnosticGroup::MissingProvide,
        DiagnosticGroup::CheckVars,
        DiagnosticGroup::Const,
        DiagnosticGroup::ConstantProperty,
        DiagnosticGroup::UselessCode,
        DiagnosticGroup::SuspiciousCode,
        DiagnosticGroup::UnusedLocalVariables,
        DiagnosticGroup::UnusedPrivateMembers,
        DiagnosticGroup::MissingReturn,
        DiagnosticGroup::MissingOverride,
        DiagnosticGroup::NonStandardJsDocs,
        DiagnosticGroup::MisplacedTypeAnnotation,
        DiagnosticGroup::Es5Strict,
        DiagnosticGroup::GlobalThis,
        DiagnosticGroup::CheckRegExp,
        DiagnosticGroup::ExternsValidation,
        DiagnosticGroup::LintChecks,
        DiagnosticGroup::Underscore,
        DiagnosticGroup::DuplicateMessage,
    ];

    /// The name used in `suppress` attributes and `@suppress` annotations.
    pub fn name(self) -> &'static str {
        match self {
            DiagnosticGroup::CheckTypes => "checkTypes",
            DiagnosticGroup::MissingProperties => "missingProperties",
            DiagnosticGroup::ReportUnknownTypes => "reportUnknownTypes",
            DiagnosticGroup::InvalidCasts => "invalidCasts",
            DiagnosticGroup::Visibility => "visibility",
            DiagnosticGroup::Deprecated => "deprecated",
            DiagnosticGroup::MissingRequire => "missingRequire",
            DiagnosticGroup::StrictMissingRequire => "strictMissingRequire",
            DiagnosticGroup::ExtraRequire => "extraRequire",
            DiagnosticGroup::MissingProvide => "missingProvide",
            DiagnosticGroup::CheckVars => "checkVars",
            DiagnosticGroup::Const => "const",
            DiagnosticGroup::ConstantProperty => "constantProperty",
            DiagnosticGroup::UselessCode => "uselessCode",
            DiagnosticGroup::SuspiciousCode => "suspiciousCode",
            DiagnosticGroup::UnusedLocalVariables => "unusedLocalVariables",
            DiagnosticGroup::UnusedPrivateMembers => "unusedPrivateMembers",
            DiagnosticGroup::MissingReturn => "missingReturn",
            DiagnosticGroup::MissingOverride => "missingOverride",
            DiagnosticGroup::NonStandardJsDocs => "nonStandardJsDocs",
            DiagnosticGroup::MisplacedTypeAnnotation => "misplacedTypeAnnotation",
            DiagnosticGroup::Es5Strict => "es5Strict",
            DiagnosticGroup::GlobalThis => "globalThis",
            DiagnosticGroup::CheckRegExp => "checkRegExp",
            DiagnosticGroup::ExternsValidation => "externsValidation",
            DiagnosticGroup::LintChecks => "lintChecks",
            DiagnosticGroup::Underscore => "underscore",
            DiagnosticGroup::DuplicateMessage => "duplicateMessage",
        }
    }

    pub fn from_name(name: &str) -> Option<DiagnosticGroup> {
        DiagnosticGroup::ALL
            .into_iter()
            .find(|group| group.name() == name.trim())
    }

    /// All kinds that belong to this group.
    pub fn kinds(self) -> Vec<DiagnosticKind> {
        DiagnosticKind::ALL
            .into_iter()
            .filter(|kind| kind.group() == self)
            .collect()
    }
}

/// Resolve a suppression code to the kinds it suppresses.
///
/// A code is either a group name (`checkTypes`) or a kind key, with or without the `JSC_`
/// prefix. Returns `None` for codes the registry does not know.
pub fn kinds_for_suppress_code(code: &str) -> Option<Vec<DiagnosticKind>> {
    if let Some(group) = DiagnosticGroup::from_name(code) {
        return Some(group.kinds());
    }
    DiagnosticKind::from_key(code).map(|kind| vec![kind])
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Warning => write!(f, "WARNING"),
            Severity::Error => write!(f, "ERROR"),
        }
    }
}

/// A diagnostic as reported by the external compiler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub severity: Severity,
    /// Key as printed by the compiler. May name a kind the registry does not know.
    pub key: Option<String>,
    /// Source file the diagnostic points at, if any.
    pub file: Option<PathBuf>,
    pub line: Option<u32>,
    pub column: Option<u32>,
    pub message: String,
    /// Source excerpt and caret lines following the header.
    pub excerpt: Vec<String>,
}

impl Diagnostic {
    pub fn new(severity: Severity, key: Option<&str>, message: impl Into<String>) -> Self {
        Self {
            severity,
            key: key.map(str::to_string),
            file: None,
            line: None,
            column: None,
            message: message.into(),
            excerpt: Vec::new(),
        }
    }

    pub fn at(mut self, file: impl Into<PathBuf>, line: u32, column: Option<u32>) -> Self {
        self.file = Some(file.into());
        self.line = Some(line);
        self.column = column;
        self
    }

    /// The registered kind of this diagnostic, if its key is known.
    pub fn kind(&self) -> Option<DiagnosticKind> {
        self.key.as_deref().and_then(DiagnosticKind::from_key)
    }
}

/// A diagnostic that survived the policy, rendered to text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SurfacedDiagnostic {
    pub severity: Severity,
    pub module: String,
    pub text: String,
}

/// Diagnostics sink for a single compilation.
///
/// The policy is borrowed read-only for the lifetime of the context, so it must be fully built
/// before the first diagnostic arrives.
#[derive(Debug)]
pub struct DiagnosticsContext<'a> {
    policy: &'a DiagnosticPolicy,
    roots: &'a [PathBuf],
    surfaced: Vec<SurfacedDiagnostic>,
    error_count: usize,
    warning_count: usize,
    suppressed_count: usize,
}

impl<'a> DiagnosticsContext<'a> {
    pub fn new(policy: &'a DiagnosticPolicy, roots: &'a [PathBuf]) -> Self {
        Self {
            policy,
            roots,
            surfaced: Vec::new(),
            error_count: 0,
            warning_count: 0,
            suppressed_count: 0,
        }
    }

    /// Module a diagnostic belongs to. Empty when the diagnostic has no file.
    pub fn module_of(&self, diagnostic: &Diagnostic) -> String {
        diagnostic
            .file
            .as_deref()
            .map(|file| helpers::module_name_for_path(file, self.roots))
            .unwrap_or_default()
    }

    /// Report a diagnostic. Returns `true` when it was surfaced.
    pub fn report(&mut self, diagnostic: Diagnostic) -> bool {
        let module = self.module_of(&diagnostic);
        let suppressed = match diagnostic.kind() {
            Some(kind) => self.policy.is_suppressed(&module, kind),
            None => self.policy.is_legacy(&module),
        };

        if suppressed {
            log::debug!(
                "Suppressed {} in module \"{}\"",
                diagnostic.key.as_deref().unwrap_or("<no key>"),
                module
            );
            self.suppressed_count += 1;
            return false;
        }

        match diagnostic.severity {
            Severity::Error => self.error_count += 1,
            Severity::Warning => self.warning_count += 1,
        }
        let text = render::render_diagnostic(&diagnostic, &module, self.policy);
        self.surfaced.push(SurfacedDiagnostic {
            severity: diagnostic.severity,
            module,
            text,
        });
        true
    }

    /// Whether any surfaced diagnostic is an error.
    pub fn has_errors(&self) -> bool {
        self.error_count > 0
    }

    pub fn error_count(&self) -> usize {
        self.error_count
    }

    pub fn warning_count(&self) -> usize {
        self.warning_count
    }

    pub fn suppressed_count(&self) -> usize {
        self.suppressed_count
    }

    pub fn surfaced(&self) -> &[SurfacedDiagnostic] {
        &self.surfaced
    }

    /// Rendered output lines: every surfaced diagnostic followed by a summary line.
    pub fn output_lines(&self) -> Vec<String> {
        let mut lines: Vec<String> = self
            .surfaced
            .iter()
            .flat_map(|diagnostic| diagnostic.text.lines().map(str::to_string))
            .collect();
        if !self.surfaced.is_empty() {
            lines.push(render::summary(self.error_count, self.warning_count));
        }
        lines
    }
}
