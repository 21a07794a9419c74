//! C-ABI wrapper around `catalog-core`.
//!
//! # Overview
//! Exposes the catalog build/parse API through `extern "C"` functions so a
//! native host (an Objective-C app, for instance) can run its own HTTP stack
//! and still share the Rust decoder and its defaulting rules.
//!
//! # Design
//! - Every `extern "C"` function wraps its body in `catch_unwind` so panics
//!   never cross the FFI boundary.
//! - Per-operation `build_*` / `parse_*` mirrors the core API 1:1.
//! - A single `FfiCatalogResult` envelope with `FfiDataTag` + `void* data`
//!   conveys success payloads and errors uniformly.
//! - The C caller owns all returned pointers and must call the matching
//!   `catalog_free_*` function to release them.

pub mod types;

use std::ffi::CStr;
use std::os::raw::c_char;
use std::panic::catch_unwind;

use catalog_core::http::HttpResponse;

use types::*;

/// Borrow a C string as UTF-8, replacing invalid sequences.
unsafe fn read_c_str(s: *const c_char) -> String {
    unsafe { CStr::from_ptr(s) }.to_string_lossy().into_owned()
}

// ---------------------------------------------------------------------------
// Client lifecycle
// ---------------------------------------------------------------------------

/// Create a new `CatalogClient` bound to `base_url`.
///
/// Returns null if `base_url` is null or if an internal panic occurs.
/// The caller must free the returned pointer with `catalog_client_free`.
#[unsafe(no_mangle)]
pub extern "C" fn catalog_client_new(base_url: *const c_char) -> *mut FfiCatalogClient {
    catch_unwind(|| {
        if base_url.is_null() {
            return std::ptr::null_mut();
        }
        let url = unsafe { read_c_str(base_url) };
        let client = catalog_core::CatalogClient::new(&url);
        Box::into_raw(Box::new(FfiCatalogClient { inner: client }))
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Free a client created by `catalog_client_new`. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn catalog_client_free(client: *mut FfiCatalogClient) {
    if !client.is_null() {
        let _ = catch_unwind(|| {
            drop(unsafe { Box::from_raw(client) });
        });
    }
}

// ---------------------------------------------------------------------------
// Build request functions
// ---------------------------------------------------------------------------

/// Build a request for one product by id.
///
/// Returns null if `client` is null.
/// The caller must free the returned pointer with `catalog_free_request`.
#[unsafe(no_mangle)]
pub extern "C" fn catalog_build_get_product(
    client: *const FfiCatalogClient,
    id: i64,
) -> *mut FfiHttpRequest {
    catch_unwind(|| {
        if client.is_null() {
            return std::ptr::null_mut();
        }
        let client = unsafe { &*client };
        FfiHttpRequest::from_core(client.inner.build_get_product(id))
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Build a request for one page of products. `limit = 0` means no limit.
#[unsafe(no_mangle)]
pub extern "C" fn catalog_build_list_products(
    client: *const FfiCatalogClient,
    limit: u32,
    skip: u32,
) -> *mut FfiHttpRequest {
    catch_unwind(|| {
        if client.is_null() {
            return std::ptr::null_mut();
        }
        let client = unsafe { &*client };
        FfiHttpRequest::from_core(client.inner.build_list_products(limit, skip))
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Build a request for every product in one page.
#[unsafe(no_mangle)]
pub extern "C" fn catalog_build_all_products(
    client: *const FfiCatalogClient,
) -> *mut FfiHttpRequest {
    catch_unwind(|| {
        if client.is_null() {
            return std::ptr::null_mut();
        }
        let client = unsafe { &*client };
        FfiHttpRequest::from_core(client.inner.build_all_products())
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Build a search request. An empty `query` is forwarded as-is.
///
/// Returns null if `client` or `query` is null.
#[unsafe(no_mangle)]
pub extern "C" fn catalog_build_search_products(
    client: *const FfiCatalogClient,
    query: *const c_char,
    limit: u32,
    skip: u32,
) -> *mut FfiHttpRequest {
    catch_unwind(|| {
        if client.is_null() || query.is_null() {
            return std::ptr::null_mut();
        }
        let client = unsafe { &*client };
        let query = unsafe { read_c_str(query) };
        FfiHttpRequest::from_core(client.inner.build_search_products(&query, limit, skip))
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Build a request for one page of a category.
///
/// Returns null if `client` or `category` is null.
#[unsafe(no_mangle)]
pub extern "C" fn catalog_build_products_by_category(
    client: *const FfiCatalogClient,
    category: *const c_char,
    limit: u32,
    skip: u32,
) -> *mut FfiHttpRequest {
    catch_unwind(|| {
        if client.is_null() || category.is_null() {
            return std::ptr::null_mut();
        }
        let client = unsafe { &*client };
        let category = unsafe { read_c_str(category) };
        FfiHttpRequest::from_core(
            client
                .inner
                .build_products_by_category(&category, limit, skip),
        )
    })
    .unwrap_or(std::ptr::null_mut())
}

// ---------------------------------------------------------------------------
// Parse response functions
// ---------------------------------------------------------------------------

/// Convert an `FfiHttpResponse` to a core `HttpResponse`. A null body is
/// treated as an empty one.
fn ffi_response_to_core(resp: &FfiHttpResponse) -> HttpResponse {
    let body = if resp.body.is_null() {
        String::new()
    } else {
        unsafe { read_c_str(resp.body) }
    };
    HttpResponse::new(resp.status, body)
}

/// Parse the response to a get-product request.
///
/// Returns a result with `data_tag = Product` on success.
#[unsafe(no_mangle)]
pub extern "C" fn catalog_parse_product(
    client: *const FfiCatalogClient,
    response: *const FfiHttpResponse,
) -> *mut FfiCatalogResult {
    catch_unwind(|| {
        if client.is_null() {
            return FfiCatalogResult::null_arg("client");
        }
        if response.is_null() {
            return FfiCatalogResult::null_arg("response");
        }
        let client = unsafe { &*client };
        let resp = unsafe { &*response };
        match client.inner.parse_product(ffi_response_to_core(resp)) {
            Ok(product) => FfiCatalogResult::ok_product(product),
            Err(e) => FfiCatalogResult::from_error(e),
        }
    })
    .unwrap_or_else(|_| FfiCatalogResult::panic("panic in catalog_parse_product"))
}

/// Parse the response to a list, all-products, search, or category request.
///
/// Returns a result with `data_tag = ProductList` on success.
#[unsafe(no_mangle)]
pub extern "C" fn catalog_parse_product_list(
    client: *const FfiCatalogClient,
    response: *const FfiHttpResponse,
) -> *mut FfiCatalogResult {
    catch_unwind(|| {
        if client.is_null() {
            return FfiCatalogResult::null_arg("client");
        }
        if response.is_null() {
            return FfiCatalogResult::null_arg("response");
        }
        let client = unsafe { &*client };
        let resp = unsafe { &*response };
        match client.inner.parse_product_page(ffi_response_to_core(resp)) {
            Ok(page) => FfiCatalogResult::ok_product_list(page),
            Err(e) => FfiCatalogResult::from_error(e),
        }
    })
    .unwrap_or_else(|_| FfiCatalogResult::panic("panic in catalog_parse_product_list"))
}

// ---------------------------------------------------------------------------
// Free functions
// ---------------------------------------------------------------------------

/// Free an `FfiHttpRequest` returned by any `catalog_build_*` function.
/// Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn catalog_free_request(req: *mut FfiHttpRequest) {
    if req.is_null() {
        return;
    }
    let _ = catch_unwind(|| unsafe { FfiHttpRequest::release(req) });
}

/// Free an `FfiCatalogResult` returned by any `catalog_parse_*` function.
/// Safe to call with null. Uses `data_tag` to determine what `data` points to.
#[unsafe(no_mangle)]
pub extern "C" fn catalog_free_result(result: *mut FfiCatalogResult) {
    if result.is_null() {
        return;
    }
    let _ = catch_unwind(|| unsafe { FfiCatalogResult::release(result) });
}

/// Free a C string allocated by this library. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn catalog_free_string(s: *mut c_char) {
    if !s.is_null() {
        let _ = catch_unwind(|| unsafe { free_c_string(s) });
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::CString;

    fn new_client() -> *mut FfiCatalogClient {
        let url = CString::new("http://localhost:3000").unwrap();
        catalog_client_new(url.as_ptr())
    }

    fn path_of(req: *mut FfiHttpRequest) -> String {
        let req_ref = unsafe { &*req };
        unsafe { CStr::from_ptr(req_ref.path) }.to_str().unwrap().to_string()
    }

    fn text(s: *mut c_char) -> &'static str {
        unsafe { CStr::from_ptr(s) }.to_str().unwrap()
    }

    #[test]
    fn client_new_and_free() {
        let client = new_client();
        assert!(!client.is_null());
        catalog_client_free(client);
    }

    #[test]
    fn client_new_null_returns_null() {
        let client = catalog_client_new(std::ptr::null());
        assert!(client.is_null());
    }

    #[test]
    fn client_free_null_is_safe() {
        catalog_client_free(std::ptr::null_mut());
    }

    #[test]
    fn build_get_product_returns_correct_request() {
        let client = new_client();
        let req = catalog_build_get_product(client, 42);
        assert!(!req.is_null());

        let req_ref = unsafe { &*req };
        assert!(matches!(req_ref.method, FfiHttpMethod::Get));
        assert_eq!(path_of(req), "http://localhost:3000/products/42");
        assert_eq!(req_ref.headers_len, 1);
        let header = unsafe { &*req_ref.headers };
        assert_eq!(text(header.key), "accept");
        assert_eq!(text(header.value), "application/json");

        catalog_free_request(req);
        catalog_client_free(client);
    }

    #[test]
    fn build_with_null_client_returns_null() {
        assert!(catalog_build_get_product(std::ptr::null(), 1).is_null());
        assert!(catalog_build_all_products(std::ptr::null()).is_null());
        assert!(catalog_build_list_products(std::ptr::null(), 1, 0).is_null());
    }

    #[test]
    fn build_list_and_all_products() {
        let client = new_client();

        let req = catalog_build_list_products(client, 10, 20);
        assert_eq!(path_of(req), "http://localhost:3000/products?limit=10&skip=20");
        catalog_free_request(req);

        let req = catalog_build_all_products(client);
        assert_eq!(path_of(req), "http://localhost:3000/products?limit=0&skip=0");
        catalog_free_request(req);

        catalog_client_free(client);
    }

    #[test]
    fn build_search_encodes_query() {
        let client = new_client();
        let query = CString::new("smart phone").unwrap();
        let req = catalog_build_search_products(client, query.as_ptr(), 30, 0);
        assert_eq!(
            path_of(req),
            "http://localhost:3000/products/search?q=smart+phone&limit=30&skip=0"
        );
        catalog_free_request(req);

        assert!(catalog_build_search_products(client, std::ptr::null(), 30, 0).is_null());
        catalog_client_free(client);
    }

    #[test]
    fn build_by_category() {
        let client = new_client();
        let category = CString::new("smartphones").unwrap();
        let req = catalog_build_products_by_category(client, category.as_ptr(), 5, 0);
        assert_eq!(
            path_of(req),
            "http://localhost:3000/products/category/smartphones?limit=5&skip=0"
        );
        catalog_free_request(req);
        catalog_client_free(client);
    }

    #[test]
    fn parse_product_success_with_derived_fields() {
        let client = new_client();
        let body = CString::new(
            r#"{
                "id": 1,
                "title": "Lamp",
                "price": 20.0,
                "discountPercentage": 25,
                "stock": 4,
                "tags": ["home", 3, "lighting"],
                "dimensions": {"width": 1, "height": 2, "depth": 3},
                "reviews": [
                    {"rating": 5, "comment": "Bright", "date": "2024-05-23T08:56:21Z", "reviewerName": "Ava"},
                    {"rating": 1, "comment": "Dim", "date": "unknown"}
                ]
            }"#,
        )
        .unwrap();
        let resp = FfiHttpResponse {
            status: 200,
            body: body.as_ptr(),
        };
        let result = catalog_parse_product(client, &resp);
        let r = unsafe { &*result };
        assert!(matches!(r.error_code, FfiErrorCode::Ok));
        assert!(r.error_message.is_null());
        assert!(matches!(r.data_tag, FfiDataTag::Product));

        let product = unsafe { &*(r.data as *const FfiProduct) };
        assert_eq!(product.id, 1);
        assert_eq!(text(product.title), "Lamp");
        assert_eq!(product.discounted_price, 15.0);
        assert!(product.in_stock);
        assert_eq!(text(product.display_price), "$20.00");
        assert_eq!(text(product.brand), "");
        assert_eq!(product.dimensions.depth, 3.0);

        assert_eq!(product.tags_len, 2);
        let tags = unsafe { std::slice::from_raw_parts(product.tags, product.tags_len as usize) };
        assert_eq!(text(tags[1]), "lighting");

        assert!(product.images.is_null());
        assert_eq!(product.images_len, 0);

        assert_eq!(product.reviews_len, 2);
        let reviews =
            unsafe { std::slice::from_raw_parts(product.reviews, product.reviews_len as usize) };
        assert_eq!(text(reviews[0].date), "2024-05-23T08:56:21+00:00");
        assert!(reviews[1].date.is_null());
        assert_eq!(text(reviews[1].reviewer_name), "");

        catalog_free_result(result);
        catalog_client_free(client);
    }

    #[test]
    fn parse_product_not_found() {
        let client = new_client();
        let body = CString::new(r#"{"message":"not found"}"#).unwrap();
        let resp = FfiHttpResponse {
            status: 404,
            body: body.as_ptr(),
        };
        let result = catalog_parse_product(client, &resp);
        let r = unsafe { &*result };
        assert!(matches!(r.error_code, FfiErrorCode::NotFound));
        assert_eq!(r.http_status, 404);
        assert!(!r.error_message.is_null());
        assert!(r.data.is_null());

        catalog_free_result(result);
        catalog_client_free(client);
    }

    #[test]
    fn parse_product_server_error_is_transport() {
        let client = new_client();
        let body = CString::new("oops").unwrap();
        let resp = FfiHttpResponse {
            status: 500,
            body: body.as_ptr(),
        };
        let result = catalog_parse_product(client, &resp);
        let r = unsafe { &*result };
        assert!(matches!(r.error_code, FfiErrorCode::Transport));
        assert_eq!(r.http_status, 500);

        catalog_free_result(result);
        catalog_client_free(client);
    }

    #[test]
    fn parse_product_null_body_is_decode_error() {
        let client = new_client();
        let resp = FfiHttpResponse {
            status: 200,
            body: std::ptr::null(),
        };
        let result = catalog_parse_product(client, &resp);
        let r = unsafe { &*result };
        assert!(matches!(r.error_code, FfiErrorCode::Decode));

        catalog_free_result(result);
        catalog_client_free(client);
    }

    #[test]
    fn parse_product_list_with_page_metadata() {
        let client = new_client();
        let body = CString::new(
            r#"{"products":[{"id":1,"title":"First"},{"id":2,"title":"Second"}],"total":50,"skip":10,"limit":2}"#,
        )
        .unwrap();
        let resp = FfiHttpResponse {
            status: 200,
            body: body.as_ptr(),
        };
        let result = catalog_parse_product_list(client, &resp);
        let r = unsafe { &*result };
        assert!(matches!(r.error_code, FfiErrorCode::Ok));
        assert!(matches!(r.data_tag, FfiDataTag::ProductList));

        let list = unsafe { &*(r.data as *const FfiProductList) };
        assert_eq!(list.len, 2);
        assert_eq!(list.total, 50);
        assert_eq!(list.skip, 10);
        assert_eq!(list.limit, 2);

        let items = unsafe { std::slice::from_raw_parts(list.items, list.len as usize) };
        assert_eq!(text(items[0].title), "First");
        assert_eq!(items[1].id, 2);

        catalog_free_result(result);
        catalog_client_free(client);
    }

    #[test]
    fn parse_product_list_empty() {
        let client = new_client();
        let body = CString::new(r#"{"products":[],"total":0,"skip":0,"limit":0}"#).unwrap();
        let resp = FfiHttpResponse {
            status: 200,
            body: body.as_ptr(),
        };
        let result = catalog_parse_product_list(client, &resp);
        let r = unsafe { &*result };
        assert!(matches!(r.error_code, FfiErrorCode::Ok));
        let list = unsafe { &*(r.data as *const FfiProductList) };
        assert_eq!(list.len, 0);
        assert!(list.items.is_null());

        catalog_free_result(result);
        catalog_client_free(client);
    }

    #[test]
    fn parse_null_client_returns_null_arg() {
        let body = CString::new("{}").unwrap();
        let resp = FfiHttpResponse {
            status: 200,
            body: body.as_ptr(),
        };
        let result = catalog_parse_product(std::ptr::null(), &resp);
        let r = unsafe { &*result };
        assert!(matches!(r.error_code, FfiErrorCode::NullArg));

        catalog_free_result(result);
    }

    #[test]
    fn parse_null_response_returns_null_arg() {
        let client = new_client();
        let result = catalog_parse_product_list(client, std::ptr::null());
        let r = unsafe { &*result };
        assert!(matches!(r.error_code, FfiErrorCode::NullArg));

        catalog_free_result(result);
        catalog_client_free(client);
    }

    #[test]
    fn free_request_null_is_safe() {
        catalog_free_request(std::ptr::null_mut());
    }

    #[test]
    fn free_result_null_is_safe() {
        catalog_free_result(std::ptr::null_mut());
    }

    #[test]
    fn free_string_null_is_safe() {
        catalog_free_string(std::ptr::null_mut());
    }
}
