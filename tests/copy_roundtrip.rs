mod common;

use common::*;
use gpucmd::*;

#[test]
fn upload_then_download() {
    let (mut device, trace) = null_device();
    let buffer = make_buffer(&mut device, 16);
    let upload = make_transfer_buffer(&mut device, TransferUsage::Upload, 16);
    let download = make_transfer_buffer(&mut device, TransferUsage::Download, 16);

    let values: [u32; 4] = [1, 2, 3, 4];
    device.write_transfer(upload, 0, &values, false).unwrap();

    let cb = device.acquire_command_buffer().unwrap();
    let pass = device.begin_copy_pass(cb).unwrap();
    let whole = BufferCopy {
        src_offset: 0,
        dst_offset: 0,
        size: 16,
    };
    device.upload_to_buffer(pass, upload, buffer, &whole, false);
    device.download_from_buffer(pass, buffer, download, &whole);
    device.end_copy_pass(pass);

    let fence = device.submit_and_acquire_fence(cb).unwrap();
    device.wait_for_fences(true, &[fence]);
    assert!(device.query_fence(fence));
    device.release_fence(fence);

    let mut out = [0u32; 4];
    device.read_transfer(download, 0, &mut out).unwrap();
    assert_eq!(out, values);

    // Already submitted.
    assert!(device.submit_and_acquire_fence(cb).is_none());
    assert_eq!(trace.count("submit_and_acquire_fence"), 1);
}

#[test]
fn cycled_destination_starts_from_zero() {
    let (mut device, _trace) = null_device();
    let buffer = make_buffer(&mut device, 12);
    let upload = make_transfer_buffer(&mut device, TransferUsage::Upload, 12);
    let download = make_transfer_buffer(&mut device, TransferUsage::Download, 12);

    device.write_transfer(upload, 0, &[5u32, 6, 7], false).unwrap();
    let cb = device.acquire_command_buffer().unwrap();
    let pass = device.begin_copy_pass(cb).unwrap();
    let whole = BufferCopy {
        src_offset: 0,
        dst_offset: 0,
        size: 12,
    };
    device.upload_to_buffer(pass, upload, buffer, &whole, false);
    device.end_copy_pass(pass);
    assert!(device.submit(cb));

    device.write_transfer(upload, 0, &[9u32], false).unwrap();
    let cb = device.acquire_command_buffer().unwrap();
    let pass = device.begin_copy_pass(cb).unwrap();
    let middle = BufferCopy {
        src_offset: 0,
        dst_offset: 4,
        size: 4,
    };
    device.upload_to_buffer(pass, upload, buffer, &middle, true);
    device.download_from_buffer(pass, buffer, download, &whole);
    device.end_copy_pass(pass);
    assert!(device.submit(cb));
    device.wait();

    let mut out = [0u32; 3];
    device.read_transfer(download, 0, &mut out).unwrap();
    assert_eq!(out, [0, 9, 0]);
}

#[test]
fn buffer_to_buffer_copy() {
    let (mut device, _trace) = null_device();
    let first = make_buffer(&mut device, 8);
    let second = make_buffer(&mut device, 8);
    let staging = make_transfer_buffer(&mut device, TransferUsage::Upload, 8);

    device
        .write_transfer(staging, 0, &[0xAAu8, 0xBB, 0xCC, 0xDD], false)
        .unwrap();

    let cb = device.acquire_command_buffer().unwrap();
    let pass = device.begin_copy_pass(cb).unwrap();
    device.upload_to_buffer(
        pass,
        staging,
        first,
        &BufferCopy {
            src_offset: 0,
            dst_offset: 0,
            size: 4,
        },
        false,
    );
    device.copy_buffer_to_buffer(
        pass,
        first,
        second,
        &BufferCopy {
            src_offset: 0,
            dst_offset: 4,
            size: 4,
        },
        false,
    );
    device.download_from_buffer(
        pass,
        second,
        staging,
        &BufferCopy {
            src_offset: 0,
            dst_offset: 0,
            size: 8,
        },
    );
    device.end_copy_pass(pass);
    assert!(device.submit(cb));

    let mut out = [0u8; 8];
    device.read_transfer(staging, 0, &mut out).unwrap();
    assert_eq!(out, [0, 0, 0, 0, 0xAA, 0xBB, 0xCC, 0xDD]);
}

#[test]
fn copies_outside_a_copy_pass_are_dropped() {
    let (mut device, trace) = null_device();
    let buffer = make_buffer(&mut device, 4);
    let upload = make_transfer_buffer(&mut device, TransferUsage::Upload, 4);
    device.write_transfer(upload, 0, &[3u32], false).unwrap();

    let cb = device.acquire_command_buffer().unwrap();
    let copy = device.begin_copy_pass(cb).unwrap();
    device.end_copy_pass(copy);
    let render = device.begin_render_pass(cb, &[], None).unwrap();
    device.upload_to_buffer(
        copy,
        upload,
        buffer,
        &BufferCopy {
            src_offset: 0,
            dst_offset: 0,
            size: 4,
        },
        false,
    );
    device.end_render_pass(render);
    assert!(device.submit(cb));
    assert!(!trace.contains("upload_to_buffer"));
}

#[test]
fn mapped_transfer_buffers() {
    let (mut device, _trace) = null_device();
    let upload = make_transfer_buffer(&mut device, TransferUsage::Upload, 4);

    {
        let mapped = device.map_transfer_buffer(upload, false).unwrap();
        mapped.copy_from_slice(&[1, 2, 3, 4]);
    }
    assert!(matches!(
        device.write_transfer(upload, 0, &[0u8], false),
        Err(GPUError::TransferBufferMapped)
    ));
    device.unmap_transfer_buffer(upload);

    let mut out = [0u8; 4];
    device.read_transfer(upload, 0, &mut out).unwrap();
    assert_eq!(out, [1, 2, 3, 4]);

    assert!(matches!(
        device.read_transfer(upload, 2, &mut out),
        Err(GPUError::OutOfBounds { .. })
    ));
}
