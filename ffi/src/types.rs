//! `#[repr(C)]` types for the FFI boundary.
//!
//! # Design
//! Each type mirrors a core type but uses C-compatible representations:
//! `*mut c_char` instead of `String`, pointer + length instead of `Vec`, and
//! tagged enums with explicit discriminants. Derived product values are
//! computed once here so C callers never reimplement them. Conversion and
//! release helpers live here to keep `lib.rs` focused on the `extern "C"`
//! surface.

use std::ffi::{c_void, CString};
use std::os::raw::c_char;

use catalog_core::error::ApiError;
use catalog_core::http::HttpMethod;
use catalog_core::types::{Dimensions, Product, ProductPage, Review};

/// Opaque handle to a `CatalogClient`. C callers receive a pointer to this
/// and pass it back into every FFI function.
pub struct FfiCatalogClient {
    pub(crate) inner: catalog_core::CatalogClient,
}

// ---------------------------------------------------------------------------
// Allocation helpers
// ---------------------------------------------------------------------------

/// Heap C string. Interior NUL bytes are dropped rather than failing.
pub(crate) fn c_string(s: impl Into<String>) -> *mut c_char {
    let mut s: String = s.into();
    s.retain(|c| c != '\0');
    CString::new(s).unwrap_or_default().into_raw()
}

pub(crate) unsafe fn free_c_string(s: *mut c_char) {
    if !s.is_null() {
        drop(unsafe { CString::from_raw(s) });
    }
}

/// Leak `items` as a boxed slice. Empty input yields a null pointer.
fn into_raw_slice<T>(items: Vec<T>) -> (*mut T, u32) {
    if items.is_empty() {
        return (std::ptr::null_mut(), 0);
    }
    let boxed = items.into_boxed_slice();
    let len = boxed.len() as u32;
    (Box::into_raw(boxed) as *mut T, len)
}

/// Reclaim a slice produced by `into_raw_slice`.
unsafe fn from_raw_slice<T>(ptr: *mut T, len: u32) -> Vec<T> {
    if ptr.is_null() || len == 0 {
        return Vec::new();
    }
    let slice = std::ptr::slice_from_raw_parts_mut(ptr, len as usize);
    unsafe { Box::from_raw(slice) }.into_vec()
}

fn string_array(items: Vec<String>) -> (*mut *mut c_char, u32) {
    into_raw_slice(items.into_iter().map(c_string).collect())
}

unsafe fn free_string_array(ptr: *mut *mut c_char, len: u32) {
    for s in unsafe { from_raw_slice(ptr, len) } {
        unsafe { free_c_string(s) };
    }
}

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// HTTP method as a C enum.
#[repr(C)]
pub enum FfiHttpMethod {
    Get = 0,
}

impl From<HttpMethod> for FfiHttpMethod {
    fn from(m: HttpMethod) -> Self {
        match m {
            HttpMethod::Get => FfiHttpMethod::Get,
        }
    }
}

/// A single HTTP header as a key-value pair of C strings.
#[repr(C)]
pub struct FfiHeader {
    pub key: *mut c_char,
    pub value: *mut c_char,
}

/// An HTTP request described as C-compatible plain data.
///
/// Built by `catalog_build_*` functions. The C caller executes the request
/// and passes the response back through `catalog_parse_*`.
#[repr(C)]
pub struct FfiHttpRequest {
    pub method: FfiHttpMethod,
    pub path: *mut c_char,
    pub headers: *mut FfiHeader,
    pub headers_len: u32,
}

impl FfiHttpRequest {
    /// Convert a core `HttpRequest` into a heap-allocated `FfiHttpRequest`.
    pub(crate) fn from_core(req: catalog_core::HttpRequest) -> *mut Self {
        let (headers, headers_len) = into_raw_slice(
            req.headers
                .into_iter()
                .map(|(k, v)| FfiHeader {
                    key: c_string(k),
                    value: c_string(v),
                })
                .collect(),
        );
        Box::into_raw(Box::new(FfiHttpRequest {
            method: req.method.into(),
            path: c_string(req.path),
            headers,
            headers_len,
        }))
    }

    pub(crate) unsafe fn release(req: *mut Self) {
        let req = unsafe { Box::from_raw(req) };
        unsafe { free_c_string(req.path) };
        for h in unsafe { from_raw_slice(req.headers, req.headers_len) } {
            unsafe {
                free_c_string(h.key);
                free_c_string(h.value);
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Response input (caller-provided, not heap-allocated by us)
// ---------------------------------------------------------------------------

/// An HTTP response described as C-compatible plain data.
///
/// The C caller constructs this on the stack after executing a request, then
/// passes a pointer to a `catalog_parse_*` function. The FFI layer reads but
/// does not free these fields.
#[repr(C)]
pub struct FfiHttpResponse {
    pub status: u16,
    pub body: *const c_char,
}

// ---------------------------------------------------------------------------
// Product types
// ---------------------------------------------------------------------------

#[repr(C)]
pub struct FfiDimensions {
    pub width: f64,
    pub height: f64,
    pub depth: f64,
}

impl From<Dimensions> for FfiDimensions {
    fn from(d: Dimensions) -> Self {
        Self {
            width: d.width,
            height: d.height,
            depth: d.depth,
        }
    }
}

/// A review exposed to C. `date` is an RFC 3339 string, or null when the
/// upstream date was missing or unparseable.
#[repr(C)]
pub struct FfiReview {
    pub rating: i64,
    pub comment: *mut c_char,
    pub date: *mut c_char,
    pub reviewer_name: *mut c_char,
    pub reviewer_email: *mut c_char,
}

impl FfiReview {
    fn from_core(review: Review) -> Self {
        Self {
            rating: review.rating,
            comment: c_string(review.comment),
            date: review
                .date
                .map(|d| c_string(d.to_rfc3339()))
                .unwrap_or(std::ptr::null_mut()),
            reviewer_name: c_string(review.reviewer_name),
            reviewer_email: c_string(review.reviewer_email),
        }
    }

    unsafe fn free_fields(&self) {
        unsafe {
            free_c_string(self.comment);
            free_c_string(self.date);
            free_c_string(self.reviewer_name);
            free_c_string(self.reviewer_email);
        }
    }
}

/// A product exposed to C, with derived values precomputed.
#[repr(C)]
pub struct FfiProduct {
    pub id: i64,
    pub title: *mut c_char,
    pub description: *mut c_char,
    pub category: *mut c_char,
    pub price: f64,
    pub discount_percentage: f64,
    pub rating: f64,
    pub stock: i64,
    pub tags: *mut *mut c_char,
    pub tags_len: u32,
    pub brand: *mut c_char,
    pub sku: *mut c_char,
    pub weight: f64,
    pub dimensions: FfiDimensions,
    pub warranty_information: *mut c_char,
    pub shipping_information: *mut c_char,
    pub availability_status: *mut c_char,
    pub reviews: *mut FfiReview,
    pub reviews_len: u32,
    pub return_policy: *mut c_char,
    pub minimum_order_quantity: i64,
    pub images: *mut *mut c_char,
    pub images_len: u32,
    pub thumbnail: *mut c_char,
    pub discounted_price: f64,
    pub in_stock: bool,
    pub display_price: *mut c_char,
}

impl FfiProduct {
    pub(crate) fn from_core(p: Product) -> Self {
        let discounted_price = p.discounted_price();
        let in_stock = p.is_in_stock();
        let display_price = c_string(p.display_price());
        let (tags, tags_len) = string_array(p.tags);
        let (images, images_len) = string_array(p.images);
        let (reviews, reviews_len) =
            into_raw_slice(p.reviews.into_iter().map(FfiReview::from_core).collect());
        Self {
            id: p.id,
            title: c_string(p.title),
            description: c_string(p.description),
            category: c_string(p.category),
            price: p.price,
            discount_percentage: p.discount_percentage,
            rating: p.rating,
            stock: p.stock,
            tags,
            tags_len,
            brand: c_string(p.brand),
            sku: c_string(p.sku),
            weight: p.weight,
            dimensions: p.dimensions.into(),
            warranty_information: c_string(p.warranty_information),
            shipping_information: c_string(p.shipping_information),
            availability_status: c_string(p.availability_status),
            reviews,
            reviews_len,
            return_policy: c_string(p.return_policy),
            minimum_order_quantity: p.minimum_order_quantity,
            images,
            images_len,
            thumbnail: c_string(p.thumbnail),
            discounted_price,
            in_stock,
            display_price,
        }
    }

    /// Free everything the product owns (but not the struct itself).
    pub(crate) unsafe fn free_fields(&self) {
        unsafe {
            for s in [
                self.title,
                self.description,
                self.category,
                self.brand,
                self.sku,
                self.warranty_information,
                self.shipping_information,
                self.availability_status,
                self.return_policy,
                self.thumbnail,
                self.display_price,
            ] {
                free_c_string(s);
            }
            free_string_array(self.tags, self.tags_len);
            free_string_array(self.images, self.images_len);
            for review in from_raw_slice(self.reviews, self.reviews_len) {
                review.free_fields();
            }
        }
    }
}

/// A page of products exposed to C.
#[repr(C)]
pub struct FfiProductList {
    pub items: *mut FfiProduct,
    pub len: u32,
    pub total: i64,
    pub skip: i64,
    pub limit: i64,
}

// ---------------------------------------------------------------------------
// Result types
// ---------------------------------------------------------------------------

/// Error codes returned in `FfiCatalogResult`.
#[repr(C)]
pub enum FfiErrorCode {
    Ok = 0,
    NotFound = 1,
    Transport = 2,
    Decode = 3,
    Cancelled = 4,
    Serialization = 5,
    Panic = 6,
    NullArg = 7,
}

/// Tag that tells `catalog_free_result` what `FfiCatalogResult::data` points to.
#[repr(C)]
pub enum FfiDataTag {
    None = 0,
    Product = 1,
    ProductList = 2,
}

/// Result envelope for all parse operations.
///
/// On success `error_code` is `Ok`, `error_message` is null, and `data`
/// points to the parsed payload (tagged by `data_tag`).
/// On failure `error_code` describes the category, `error_message` is a
/// human-readable C string, and `data` is null.
#[repr(C)]
pub struct FfiCatalogResult {
    pub error_code: FfiErrorCode,
    pub error_message: *mut c_char,
    pub http_status: u16,
    pub data_tag: FfiDataTag,
    pub data: *mut c_void,
}

impl FfiCatalogResult {
    fn boxed(
        error_code: FfiErrorCode,
        error_message: *mut c_char,
        http_status: u16,
        data_tag: FfiDataTag,
        data: *mut c_void,
    ) -> *mut Self {
        Box::into_raw(Box::new(FfiCatalogResult {
            error_code,
            error_message,
            http_status,
            data_tag,
            data,
        }))
    }

    /// Build a success result carrying a single `FfiProduct`.
    pub(crate) fn ok_product(product: Product) -> *mut Self {
        let data = Box::into_raw(Box::new(FfiProduct::from_core(product))) as *mut c_void;
        Self::boxed(FfiErrorCode::Ok, std::ptr::null_mut(), 0, FfiDataTag::Product, data)
    }

    /// Build a success result carrying a `FfiProductList`.
    pub(crate) fn ok_product_list(page: ProductPage) -> *mut Self {
        let (items, len) =
            into_raw_slice(page.products.into_iter().map(FfiProduct::from_core).collect());
        let list = Box::new(FfiProductList {
            items,
            len,
            total: page.total,
            skip: page.skip,
            limit: page.limit,
        });
        let data = Box::into_raw(list) as *mut c_void;
        Self::boxed(FfiErrorCode::Ok, std::ptr::null_mut(), 0, FfiDataTag::ProductList, data)
    }

    /// Build an error result from an `ApiError`.
    pub(crate) fn from_error(err: ApiError) -> *mut Self {
        let code = match &err {
            ApiError::NotFound => FfiErrorCode::NotFound,
            ApiError::Transport { .. } => FfiErrorCode::Transport,
            ApiError::Decode(_) => FfiErrorCode::Decode,
            ApiError::Cancelled => FfiErrorCode::Cancelled,
            ApiError::Serialization(_) => FfiErrorCode::Serialization,
        };
        let status = err.status().unwrap_or(0);
        Self::boxed(code, c_string(err.to_string()), status, FfiDataTag::None, std::ptr::null_mut())
    }

    /// Build an error result for a null argument.
    pub(crate) fn null_arg(name: &str) -> *mut Self {
        let msg = c_string(format!("null argument: {name}"));
        Self::boxed(FfiErrorCode::NullArg, msg, 0, FfiDataTag::None, std::ptr::null_mut())
    }

    /// Build an error result for a caught panic.
    pub(crate) fn panic(msg: &str) -> *mut Self {
        Self::boxed(FfiErrorCode::Panic, c_string(msg), 0, FfiDataTag::None, std::ptr::null_mut())
    }

    pub(crate) unsafe fn release(result: *mut Self) {
        let result = unsafe { Box::from_raw(result) };
        unsafe { free_c_string(result.error_message) };
        if result.data.is_null() {
            return;
        }
        match result.data_tag {
            FfiDataTag::Product => {
                let product = unsafe { Box::from_raw(result.data as *mut FfiProduct) };
                unsafe { product.free_fields() };
            }
            FfiDataTag::ProductList => {
                let list = unsafe { Box::from_raw(result.data as *mut FfiProductList) };
                for product in unsafe { from_raw_slice(list.items, list.len) } {
                    unsafe { product.free_fields() };
                }
            }
            FfiDataTag::None => {}
        }
    }
}
